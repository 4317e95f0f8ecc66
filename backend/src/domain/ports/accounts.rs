//! Driving ports for profile and session-backed account operations.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::profile::{DisplayName, Profile, SessionIdentity, UserId};

/// Read-side account operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountsQuery: Send + Sync {
    /// Fetch the caller's own profile.
    async fn profile(&self, user_id: &UserId) -> Result<Profile, Error>;
}

/// Write-side account operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccountsCommand: Send + Sync {
    /// Upsert the profile row from an externally authenticated identity.
    async fn establish_profile(&self, identity: &SessionIdentity) -> Result<Profile, Error>;

    /// Replace or clear the caller's display name.
    async fn update_display_name(
        &self,
        user_id: &UserId,
        name: Option<DisplayName>,
    ) -> Result<(), Error>;

    /// Delete the caller's account and everything it owns.
    async fn delete_account(&self, user_id: &UserId) -> Result<(), Error>;
}
