//! Automation catalogue services.
//!
//! `AutomationsService` implements the driving ports for browsing,
//! submitting, and voting. It composes the automation repository with the
//! vote repository: rows come back from the store ordered by creation
//! time, aggregates are derived per page, and vote-ranked orderings are
//! applied here after aggregation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use tracing::warn;
use uuid::Uuid;

use crate::domain::automation::{
    Automation, AutomationForm, AutomationId, validate_form,
};
use crate::domain::error::Error;
use crate::domain::ports::{
    AutomationAnnouncement, AutomationChanges, AutomationFilter, AutomationListing,
    AutomationRepository, AutomationRepositoryError, AutomationWithAuthor, AutomationsCommand,
    AutomationsQuery, CreatedAutomation, ListAutomationsRequest, ListingOrder,
    NewAutomationRecord, Notifier, VoteReceipt, VoteRepository, VoteRepositoryError,
    VotesCommand,
};
use crate::domain::profile::UserId;
use crate::domain::slug::{slugify, with_random_suffix, with_timestamp_suffix};
use crate::domain::vote::VoteValue;

/// Slug collision retries before falling back to a timestamp suffix.
const SLUG_ATTEMPTS: usize = 5;

/// Slug base used when a title contains no alphanumeric characters at all.
const SLUG_FALLBACK_BASE: &str = "automation";

/// Automation catalogue service implementing the driving ports.
pub struct AutomationsService<A, V, N> {
    automations: Arc<A>,
    votes: Arc<V>,
    notifier: Arc<N>,
}

impl<A, V, N> AutomationsService<A, V, N> {
    /// Create a new service over the given adapters.
    pub fn new(automations: Arc<A>, votes: Arc<V>, notifier: Arc<N>) -> Self {
        Self {
            automations,
            votes,
            notifier,
        }
    }
}

fn map_automation_error(error: AutomationRepositoryError) -> Error {
    match error {
        AutomationRepositoryError::Connection { message } => {
            warn!(%message, "automation store unreachable");
            Error::service_unavailable()
        }
        AutomationRepositoryError::Query { message } => {
            Error::internal(format!("automation storage error: {message}"))
        }
        AutomationRepositoryError::Conflict { message } => {
            Error::internal(format!("automation storage conflict: {message}"))
        }
    }
}

fn map_vote_error(error: VoteRepositoryError) -> Error {
    match error {
        VoteRepositoryError::Connection { message } => {
            warn!(%message, "vote store unreachable");
            Error::service_unavailable()
        }
        VoteRepositoryError::Query { message } => {
            Error::internal(format!("vote storage error: {message}"))
        }
    }
}

fn form_validation_error(errors: crate::domain::automation::FieldErrors) -> Error {
    Error::invalid_request("Please review the form fields and try again.")
        .with_details(json!({ "fieldErrors": errors }))
}

fn not_found() -> Error {
    Error::not_found("automation not found")
}

fn not_owner() -> Error {
    Error::forbidden("you can only modify automations you created")
}

fn sort_by_top(listings: &mut [AutomationListing]) {
    listings.sort_by(|a, b| {
        b.statistics
            .vote_total
            .cmp(&a.statistics.vote_total)
            .then_with(|| b.automation.created_at.cmp(&a.automation.created_at))
    });
}

fn sort_by_trending(listings: &mut [AutomationListing]) {
    listings.sort_by(|a, b| {
        b.statistics
            .recent_votes
            .cmp(&a.statistics.recent_votes)
            .then_with(|| b.statistics.vote_total.cmp(&a.statistics.vote_total))
            .then_with(|| b.automation.created_at.cmp(&a.automation.created_at))
    });
}

impl<A, V, N> AutomationsService<A, V, N>
where
    A: AutomationRepository,
    V: VoteRepository,
    N: Notifier,
{
    /// Join aggregate statistics and the viewer's own votes onto rows.
    ///
    /// Both lookups are batch queries keyed by automation id, so a page of
    /// rows costs two round trips regardless of its length.
    async fn attach_vote_context(
        &self,
        rows: Vec<AutomationWithAuthor>,
        viewer: Option<&UserId>,
    ) -> Result<Vec<AutomationListing>, Error> {
        let ids: Vec<Uuid> = rows
            .iter()
            .map(|row| *row.automation.id.as_uuid())
            .collect();

        let statistics = self
            .votes
            .statistics_for(&ids)
            .await
            .map_err(map_vote_error)?;
        let own_votes: HashMap<Uuid, VoteValue> = match viewer {
            Some(viewer) => self
                .votes
                .cast_by_user(viewer, &ids)
                .await
                .map_err(map_vote_error)?,
            None => HashMap::new(),
        };

        Ok(rows
            .into_iter()
            .map(|row| {
                let id = *row.automation.id.as_uuid();
                AutomationListing {
                    statistics: statistics.get(&id).copied().unwrap_or_default(),
                    viewer_vote: own_votes.get(&id).map_or(0, |value| value.as_i16()),
                    automation: row.automation,
                    author: row.author,
                }
            })
            .collect())
    }

    async fn fetch_owned(&self, id: &AutomationId, owner: &UserId) -> Result<Automation, Error> {
        let existing = self
            .automations
            .find_by_id(id)
            .await
            .map_err(map_automation_error)?
            .ok_or_else(not_found)?;
        if &existing.user_id != owner {
            return Err(not_owner());
        }
        Ok(existing)
    }

    async fn generate_unique_slug(&self, title: &str) -> Result<String, Error> {
        let derived = slugify(title);
        let base = if derived.is_empty() {
            SLUG_FALLBACK_BASE.to_owned()
        } else {
            derived
        };

        let mut candidate = base.clone();
        for _ in 0..SLUG_ATTEMPTS {
            let taken = self
                .automations
                .slug_exists(&candidate)
                .await
                .map_err(map_automation_error)?;
            if !taken {
                return Ok(candidate);
            }
            candidate = {
                let mut rng = rand::thread_rng();
                with_random_suffix(&base, &mut rng)
            };
        }
        Ok(with_timestamp_suffix(&base, Utc::now()))
    }
}

#[async_trait]
impl<A, V, N> AutomationsQuery for AutomationsService<A, V, N>
where
    A: AutomationRepository,
    V: VoteRepository,
    N: Notifier,
{
    async fn list(
        &self,
        viewer: Option<UserId>,
        request: &ListAutomationsRequest,
    ) -> Result<Vec<AutomationListing>, Error> {
        // Vote-ranked pages need aggregates for every candidate row, so
        // the limit is applied after sorting rather than pushed down.
        let stored_limit = match request.order {
            ListingOrder::New => request.limit.map(|limit| limit as i64),
            ListingOrder::Top => None,
        };
        let filter = AutomationFilter {
            search: request.search.clone(),
            limit: stored_limit,
        };

        let rows = self
            .automations
            .list(&filter)
            .await
            .map_err(map_automation_error)?;
        let mut listings = self.attach_vote_context(rows, viewer.as_ref()).await?;

        if request.order == ListingOrder::Top {
            sort_by_top(&mut listings);
            if let Some(limit) = request.limit {
                listings.truncate(limit);
            }
        }
        Ok(listings)
    }

    async fn trending(
        &self,
        viewer: Option<UserId>,
        limit: usize,
    ) -> Result<Vec<AutomationListing>, Error> {
        let rows = self
            .automations
            .list(&AutomationFilter::default())
            .await
            .map_err(map_automation_error)?;
        let mut listings = self.attach_vote_context(rows, viewer.as_ref()).await?;
        sort_by_trending(&mut listings);
        listings.truncate(limit);
        Ok(listings)
    }

    async fn get_by_slug(
        &self,
        viewer: Option<UserId>,
        slug: &str,
    ) -> Result<AutomationListing, Error> {
        let row = self
            .automations
            .find_by_slug(slug)
            .await
            .map_err(map_automation_error)?
            .ok_or_else(not_found)?;
        let mut listings = self.attach_vote_context(vec![row], viewer.as_ref()).await?;
        listings.pop().ok_or_else(not_found)
    }

    async fn list_mine(&self, owner: &UserId) -> Result<Vec<AutomationListing>, Error> {
        let rows = self
            .automations
            .list_by_owner(owner)
            .await
            .map_err(map_automation_error)?;
        self.attach_vote_context(rows, Some(owner)).await
    }

    async fn get_for_editing(
        &self,
        id: &AutomationId,
        owner: &UserId,
    ) -> Result<Automation, Error> {
        // The edit form treats foreign automations as absent rather than
        // revealing their existence.
        let existing = self
            .automations
            .find_by_id(id)
            .await
            .map_err(map_automation_error)?
            .ok_or_else(not_found)?;
        if &existing.user_id != owner {
            return Err(not_found());
        }
        Ok(existing)
    }
}

#[async_trait]
impl<A, V, N> AutomationsCommand for AutomationsService<A, V, N>
where
    A: AutomationRepository,
    V: VoteRepository,
    N: Notifier,
{
    async fn create(
        &self,
        owner: &UserId,
        form: AutomationForm,
    ) -> Result<CreatedAutomation, Error> {
        let draft = validate_form(&form).map_err(form_validation_error)?;
        let slug = self.generate_unique_slug(&draft.title).await?;

        let mut record = NewAutomationRecord {
            id: AutomationId::random(),
            user_id: owner.clone(),
            title: draft.title,
            summary: draft.summary,
            description: draft.description,
            prompt: draft.prompt,
            tags: draft.tags,
            slug,
        };
        let automation = match self.automations.insert(&record).await {
            Ok(automation) => automation,
            // A submission that won the slug between our existence check
            // and the insert; fall back to the timestamp suffix once.
            Err(AutomationRepositoryError::Conflict { .. }) => {
                record.slug = with_timestamp_suffix(&record.slug, Utc::now());
                self.automations
                    .insert(&record)
                    .await
                    .map_err(map_automation_error)?
            }
            Err(err) => return Err(map_automation_error(err)),
        };
        let slug = record.slug;

        self.notifier
            .automation_published(&AutomationAnnouncement {
                title: automation.title.clone(),
                slug: slug.clone(),
                author: owner.clone(),
            })
            .await;

        Ok(CreatedAutomation { automation, slug })
    }

    async fn update(
        &self,
        id: &AutomationId,
        owner: &UserId,
        form: AutomationForm,
    ) -> Result<Automation, Error> {
        let draft = validate_form(&form).map_err(form_validation_error)?;
        self.fetch_owned(id, owner).await?;

        let changes = AutomationChanges {
            title: draft.title,
            summary: draft.summary,
            description: draft.description,
            prompt: draft.prompt,
            tags: draft.tags,
        };
        self.automations
            .update(id, &changes)
            .await
            .map_err(map_automation_error)
    }

    async fn delete(&self, id: &AutomationId, owner: &UserId) -> Result<(), Error> {
        self.fetch_owned(id, owner).await?;
        self.automations
            .delete(id)
            .await
            .map_err(map_automation_error)
    }
}

#[async_trait]
impl<A, V, N> VotesCommand for AutomationsService<A, V, N>
where
    A: AutomationRepository,
    V: VoteRepository,
    N: Notifier,
{
    async fn toggle_vote(
        &self,
        actor: &UserId,
        automation_id: &AutomationId,
        value: VoteValue,
    ) -> Result<VoteReceipt, Error> {
        self.automations
            .find_by_id(automation_id)
            .await
            .map_err(map_automation_error)?
            .ok_or_else(not_found)?;

        let transition = self
            .votes
            .toggle(*automation_id.as_uuid(), actor, value)
            .await
            .map_err(map_vote_error)?;

        let statistics = self
            .votes
            .statistics_for(&[*automation_id.as_uuid()])
            .await
            .map_err(map_vote_error)?
            .get(automation_id.as_uuid())
            .copied()
            .unwrap_or_default();

        Ok(VoteReceipt {
            viewer_vote: transition
                .resulting_vote(value)
                .map_or(0, VoteValue::as_i16),
            statistics,
        })
    }
}
