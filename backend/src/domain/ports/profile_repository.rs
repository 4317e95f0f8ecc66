//! Port for profile persistence.

use async_trait::async_trait;

use crate::domain::profile::{DisplayName, Profile, SessionIdentity, UserId};

/// Errors raised by profile repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProfileRepositoryError {
    /// Repository connection could not be established.
    #[error("profile repository connection failed: {message}")]
    Connection {
        /// Underlying transport message.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("profile repository query failed: {message}")]
    Query {
        /// Underlying store message.
        message: String,
    },
}

impl ProfileRepositoryError {
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

/// Port for profile storage and retrieval.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    /// Insert or refresh the profile row for an authenticated identity and
    /// return the stored profile.
    ///
    /// Provider-supplied fields only fill gaps: an existing display name is
    /// never overwritten by a sign-in.
    async fn upsert_from_identity(
        &self,
        identity: &SessionIdentity,
    ) -> Result<Profile, ProfileRepositoryError>;

    /// Fetch one profile by user id.
    async fn find(&self, user_id: &UserId) -> Result<Option<Profile>, ProfileRepositoryError>;

    /// Replace the display name; `None` clears it.
    async fn update_name(
        &self,
        user_id: &UserId,
        name: Option<DisplayName>,
    ) -> Result<(), ProfileRepositoryError>;

    /// Delete the profile row; automations, votes, and subscriptions
    /// cascade at the store level.
    async fn delete(&self, user_id: &UserId) -> Result<(), ProfileRepositoryError>;
}
