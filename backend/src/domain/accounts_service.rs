//! Account services over the profile repository.
//!
//! Sign-in flows upsert the profile from the externally authenticated
//! identity; settings flows read it back and rename it.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::domain::error::Error;
use crate::domain::ports::{
    AccountsCommand, AccountsQuery, ProfileRepository, ProfileRepositoryError,
};
use crate::domain::profile::{DisplayName, Profile, SessionIdentity, UserId};

/// Account service implementing the driving ports.
pub struct AccountsService<P> {
    profiles: Arc<P>,
}

impl<P> AccountsService<P> {
    /// Create a new service over the given repository.
    pub fn new(profiles: Arc<P>) -> Self {
        Self { profiles }
    }
}

fn map_profile_error(error: ProfileRepositoryError) -> Error {
    match error {
        ProfileRepositoryError::Connection { message } => {
            warn!(%message, "profile store unreachable");
            Error::service_unavailable()
        }
        ProfileRepositoryError::Query { message } => {
            Error::internal(format!("profile storage error: {message}"))
        }
    }
}

#[async_trait]
impl<P> AccountsQuery for AccountsService<P>
where
    P: ProfileRepository,
{
    async fn profile(&self, user_id: &UserId) -> Result<Profile, Error> {
        self.profiles
            .find(user_id)
            .await
            .map_err(map_profile_error)?
            .ok_or_else(|| Error::not_found("profile not found"))
    }
}

#[async_trait]
impl<P> AccountsCommand for AccountsService<P>
where
    P: ProfileRepository,
{
    async fn establish_profile(&self, identity: &SessionIdentity) -> Result<Profile, Error> {
        self.profiles
            .upsert_from_identity(identity)
            .await
            .map_err(map_profile_error)
    }

    async fn update_display_name(
        &self,
        user_id: &UserId,
        name: Option<DisplayName>,
    ) -> Result<(), Error> {
        self.profiles
            .update_name(user_id, name)
            .await
            .map_err(map_profile_error)
    }

    async fn delete_account(&self, user_id: &UserId) -> Result<(), Error> {
        // Owned automations, votes, and subscriptions cascade with the
        // profile row.
        self.profiles
            .delete(user_id)
            .await
            .map_err(map_profile_error)
    }
}
