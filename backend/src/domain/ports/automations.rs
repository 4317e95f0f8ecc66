//! Driving ports for browsing, submitting, and voting on automations.

use async_trait::async_trait;

use crate::domain::automation::{Automation, AutomationForm, AutomationId};
use crate::domain::error::Error;
use crate::domain::profile::UserId;
use crate::domain::vote::{VoteStatistics, VoteValue};

use super::automation_repository::AuthorSummary;

/// Listing order requested by a browse page.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListingOrder {
    /// Creation timestamp, newest first.
    #[default]
    New,
    /// All-time vote total, highest first; ties break newest-first.
    Top,
}

/// Browse-page listing request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListAutomationsRequest {
    /// Free-text search term.
    pub search: Option<String>,
    /// Result limit; `None` returns all matches.
    pub limit: Option<usize>,
    /// Requested ordering.
    pub order: ListingOrder,
}

/// An automation enriched with everything a card or detail page renders.
#[derive(Debug, Clone, PartialEq)]
pub struct AutomationListing {
    /// The automation row.
    pub automation: Automation,
    /// Joined author fields, if the profile still exists.
    pub author: Option<AuthorSummary>,
    /// Derived vote aggregates.
    pub statistics: VoteStatistics,
    /// The viewer's own vote: +1, -1, or 0 when absent or anonymous.
    pub viewer_vote: i16,
}

/// Result of a successful submission.
#[derive(Debug, Clone, PartialEq)]
pub struct CreatedAutomation {
    /// The stored automation.
    pub automation: Automation,
    /// Its generated slug, echoed for redirects.
    pub slug: String,
}

/// Result of a vote toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteReceipt {
    /// The voter's resulting vote: +1, -1, or 0 after an un-vote.
    pub viewer_vote: i16,
    /// Fresh aggregates for the automation.
    pub statistics: VoteStatistics,
}

/// Read-side operations over the automation catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AutomationsQuery: Send + Sync {
    /// List automations for a browse page.
    async fn list(
        &self,
        viewer: Option<UserId>,
        request: &ListAutomationsRequest,
    ) -> Result<Vec<AutomationListing>, Error>;

    /// List the automations with the highest recent vote velocity.
    async fn trending(
        &self,
        viewer: Option<UserId>,
        limit: usize,
    ) -> Result<Vec<AutomationListing>, Error>;

    /// Fetch one automation by slug for its detail page.
    async fn get_by_slug(
        &self,
        viewer: Option<UserId>,
        slug: &str,
    ) -> Result<AutomationListing, Error>;

    /// List the caller's own automations for the dashboard.
    async fn list_mine(&self, owner: &UserId) -> Result<Vec<AutomationListing>, Error>;

    /// Fetch one automation for its edit form; owner-gated.
    async fn get_for_editing(
        &self,
        id: &AutomationId,
        owner: &UserId,
    ) -> Result<Automation, Error>;
}

/// Write-side operations over the automation catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AutomationsCommand: Send + Sync {
    /// Validate and store a new automation, then announce it best-effort.
    async fn create(
        &self,
        owner: &UserId,
        form: AutomationForm,
    ) -> Result<CreatedAutomation, Error>;

    /// Validate and apply changes to an owned automation.
    async fn update(
        &self,
        id: &AutomationId,
        owner: &UserId,
        form: AutomationForm,
    ) -> Result<Automation, Error>;

    /// Delete an owned automation, cascading its votes.
    async fn delete(&self, id: &AutomationId, owner: &UserId) -> Result<(), Error>;
}

/// Vote mutations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VotesCommand: Send + Sync {
    /// Apply the three-way vote toggle and return the fresh state.
    async fn toggle_vote(
        &self,
        actor: &UserId,
        automation_id: &AutomationId,
        value: VoteValue,
    ) -> Result<VoteReceipt, Error>;
}
