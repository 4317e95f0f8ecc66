//! Port for notification-subscription persistence.
//!
//! `set` carries the upsert contract that keeps concurrent toggles safe:
//! enabling is a single conflict-aware insert, disabling is a plain
//! conditional update that never materialises a row just to record "off".

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::profile::{EmailAddress, UserId};
use crate::domain::subscription::{
    Subscription, SubscriptionCategory, SubscriptionId, SubscriptionPreferences,
};

/// Errors raised by subscription repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubscriptionRepositoryError {
    /// Repository connection could not be established.
    #[error("subscription repository connection failed: {message}")]
    Connection {
        /// Underlying transport message.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("subscription repository query failed: {message}")]
    Query {
        /// Underlying store message.
        message: String,
    },
}

impl SubscriptionRepositoryError {
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
}

/// One deliverable recipient of a notification fan-out.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriberContact {
    /// Subscription row the unsubscribe link will reference.
    pub subscription_id: SubscriptionId,
    /// Recipient address from the joined profile.
    pub email: EmailAddress,
}

/// Port for subscription storage and recipient queries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionRepository: Send + Sync {
    /// Read one user's per-category preference flags.
    async fn preferences_for(
        &self,
        user_id: &UserId,
    ) -> Result<SubscriptionPreferences, SubscriptionRepositoryError>;

    /// Upsert the preference flag for `(user, category)`.
    ///
    /// Enabling inserts on conflict; disabling updates in place and is a
    /// no-op when no row exists.
    async fn set(
        &self,
        user_id: &UserId,
        category: SubscriptionCategory,
        active: bool,
    ) -> Result<(), SubscriptionRepositoryError>;

    /// Fetch one subscription row by id.
    async fn find(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, SubscriptionRepositoryError>;

    /// Mark one subscription row inactive.
    async fn deactivate(&self, id: &SubscriptionId) -> Result<(), SubscriptionRepositoryError>;

    /// List the active subscribers of a category, joined with their
    /// profile emails, optionally excluding one user (the author of the
    /// triggering automation).
    async fn active_recipients(
        &self,
        category: SubscriptionCategory,
        exclude: Option<UserId>,
    ) -> Result<Vec<SubscriberContact>, SubscriptionRepositoryError>;
}

/// In-memory implementation mirroring the SQL adapter's upsert semantics.
#[derive(Debug, Default)]
pub struct InMemorySubscriptionRepository {
    rows: Mutex<Vec<Subscription>>,
    emails: Mutex<HashMap<UserId, EmailAddress>>,
}

impl InMemorySubscriptionRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a profile email for recipient queries.
    pub fn register_email(&self, user_id: UserId, email: EmailAddress) {
        let mut emails = self
            .emails
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        emails.insert(user_id, email);
    }

    /// Number of stored subscription rows.
    pub fn row_count(&self) -> usize {
        self.rows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .len()
    }

    /// Fetch the stored row for `(user, category)`, if any.
    pub fn row_for(
        &self,
        user_id: &UserId,
        category: SubscriptionCategory,
    ) -> Option<Subscription> {
        self.rows
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .iter()
            .find(|row| &row.user_id == user_id && row.category == category)
            .cloned()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn preferences_for(
        &self,
        user_id: &UserId,
    ) -> Result<SubscriptionPreferences, SubscriptionRepositoryError> {
        let rows = self.rows.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(SubscriptionPreferences::from_pairs(
            rows.iter()
                .filter(|row| &row.user_id == user_id)
                .map(|row| (row.category, row.active)),
        ))
    }

    async fn set(
        &self,
        user_id: &UserId,
        category: SubscriptionCategory,
        active: bool,
    ) -> Result<(), SubscriptionRepositoryError> {
        let mut rows = self.rows.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let existing = rows
            .iter_mut()
            .find(|row| &row.user_id == user_id && row.category == category);
        match existing {
            Some(row) => {
                row.active = active;
                row.updated_at = Utc::now();
            }
            None if active => {
                rows.push(Subscription {
                    id: SubscriptionId::random(),
                    user_id: user_id.clone(),
                    category,
                    active: true,
                    created_at: Utc::now(),
                    updated_at: Utc::now(),
                });
            }
            // Disabling with no stored row records nothing.
            None => {}
        }
        Ok(())
    }

    async fn find(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, SubscriptionRepositoryError> {
        let rows = self.rows.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(rows.iter().find(|row| &row.id == id).cloned())
    }

    async fn deactivate(&self, id: &SubscriptionId) -> Result<(), SubscriptionRepositoryError> {
        let mut rows = self.rows.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(row) = rows.iter_mut().find(|row| &row.id == id) {
            row.active = false;
            row.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn active_recipients(
        &self,
        category: SubscriptionCategory,
        exclude: Option<UserId>,
    ) -> Result<Vec<SubscriberContact>, SubscriptionRepositoryError> {
        let rows = self.rows.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let emails = self
            .emails
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(rows
            .iter()
            .filter(|row| row.category == category && row.active)
            .filter(|row| exclude.as_ref() != Some(&row.user_id))
            .filter_map(|row| {
                emails.get(&row.user_id).map(|email| SubscriberContact {
                    subscription_id: row.id,
                    email: email.clone(),
                })
            })
            .collect())
    }
}
