//! Port for automation persistence.
//!
//! Adapters provide CRUD, slug lookup, and filtered listing over the
//! automations table, with the author profile joined in. Vote aggregation
//! is a separate port; the automation service composes the two.

use async_trait::async_trait;

use crate::domain::automation::{Automation, AutomationId};
use crate::domain::profile::UserId;

/// Errors raised by automation repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AutomationRepositoryError {
    /// Repository connection could not be established.
    #[error("automation repository connection failed: {message}")]
    Connection {
        /// Underlying transport message.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("automation repository query failed: {message}")]
    Query {
        /// Underlying store message.
        message: String,
    },
    /// A uniqueness constraint (slug) rejected the write.
    #[error("automation conflicts with an existing row: {message}")]
    Conflict {
        /// Underlying constraint message.
        message: String,
    },
}

impl AutomationRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a conflict error with the given message.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

/// Listing filter passed to [`AutomationRepository::list`].
///
/// Rows always come back creation-descending; vote-ranked orderings
/// ("top", "trending") are applied by the service after aggregation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutomationFilter {
    /// Case-insensitive free-text term matched against title, summary,
    /// description, prompt, and tag membership.
    pub search: Option<String>,
    /// Maximum number of rows to return; `None` returns all matches.
    pub limit: Option<i64>,
}

/// Author fields joined onto a listed automation.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthorSummary {
    /// Author user id.
    pub id: UserId,
    /// Display name, if the author has set one.
    pub name: Option<String>,
    /// Avatar reference, if any.
    pub avatar_url: Option<String>,
}

/// An automation row joined with its author profile.
#[derive(Debug, Clone, PartialEq)]
pub struct AutomationWithAuthor {
    /// The automation row.
    pub automation: Automation,
    /// Joined author profile fields; `None` when the profile row is absent.
    pub author: Option<AuthorSummary>,
}

/// New automation row to insert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAutomationRecord {
    /// Pre-generated row identifier.
    pub id: AutomationId,
    /// Owning user.
    pub user_id: UserId,
    /// Validated title.
    pub title: String,
    /// Validated summary.
    pub summary: String,
    /// Validated description.
    pub description: Option<String>,
    /// Validated prompt.
    pub prompt: String,
    /// Normalised tags.
    pub tags: Vec<String>,
    /// Unique slug.
    pub slug: String,
}

/// Field changes applied by [`AutomationRepository::update`].
#[derive(Debug, Clone, PartialEq)]
pub struct AutomationChanges {
    /// New title.
    pub title: String,
    /// New summary.
    pub summary: String,
    /// New description.
    pub description: Option<String>,
    /// New prompt.
    pub prompt: String,
    /// New tags.
    pub tags: Vec<String>,
}

/// Port for automation storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AutomationRepository: Send + Sync {
    /// List automations matching the filter, joined with their authors.
    async fn list(
        &self,
        filter: &AutomationFilter,
    ) -> Result<Vec<AutomationWithAuthor>, AutomationRepositoryError>;

    /// List every automation owned by one user, newest first.
    async fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<AutomationWithAuthor>, AutomationRepositoryError>;

    /// Fetch one automation by slug.
    async fn find_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<AutomationWithAuthor>, AutomationRepositoryError>;

    /// Fetch one automation row by id, without the author join.
    async fn find_by_id(
        &self,
        id: &AutomationId,
    ) -> Result<Option<Automation>, AutomationRepositoryError>;

    /// Return whether any automation already claims `slug`.
    async fn slug_exists(&self, slug: &str) -> Result<bool, AutomationRepositoryError>;

    /// Insert a new automation and return the stored row.
    async fn insert(
        &self,
        record: &NewAutomationRecord,
    ) -> Result<Automation, AutomationRepositoryError>;

    /// Apply field changes to an existing automation and return the
    /// updated row.
    async fn update(
        &self,
        id: &AutomationId,
        changes: &AutomationChanges,
    ) -> Result<Automation, AutomationRepositoryError>;

    /// Delete an automation; its votes cascade at the store level.
    async fn delete(&self, id: &AutomationId) -> Result<(), AutomationRepositoryError>;
}
