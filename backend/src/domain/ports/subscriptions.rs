//! Driving ports for notification subscriptions and unsubscribe links.

use async_trait::async_trait;

use crate::domain::error::Error;
use crate::domain::profile::UserId;
use crate::domain::subscription::{
    SubscriptionCategory, SubscriptionId, SubscriptionPreferences,
};

/// Outcome of a token-authorised unsubscribe request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsubscribeOutcome {
    /// The subscription was active and has been deactivated.
    Deactivated,
    /// The subscription was already inactive; nothing changed.
    AlreadyInactive,
}

/// Read-side subscription operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionsQuery: Send + Sync {
    /// Read the caller's per-category preference flags.
    async fn preferences(&self, user_id: &UserId) -> Result<SubscriptionPreferences, Error>;
}

/// Write-side subscription operations.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubscriptionsCommand: Send + Sync {
    /// Flip the caller's preference for one category.
    async fn set_subscription(
        &self,
        user_id: &UserId,
        category: SubscriptionCategory,
        active: bool,
    ) -> Result<(), Error>;

    /// Deactivate a subscription identified by an unsubscribe link.
    ///
    /// The token must verify against `(subscription_id, category)`; no
    /// session is required.
    async fn unsubscribe(
        &self,
        subscription_id: &SubscriptionId,
        category: SubscriptionCategory,
        token: &str,
    ) -> Result<UnsubscribeOutcome, Error>;
}
