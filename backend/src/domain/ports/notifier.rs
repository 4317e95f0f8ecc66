//! Port for best-effort notification fan-out.
//!
//! Implementations never return errors: delivery failures are logged and
//! swallowed so the triggering mutation can never fail or roll back on
//! their account.

use async_trait::async_trait;

use crate::domain::profile::UserId;

/// Facts about a freshly published automation.
#[derive(Debug, Clone, PartialEq)]
pub struct AutomationAnnouncement {
    /// Title of the new automation.
    pub title: String,
    /// Slug of the new automation.
    pub slug: String,
    /// Author, excluded from the recipient list.
    pub author: UserId,
}

/// One line item of the weekly trending digest.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendingDigestEntry {
    /// Automation title.
    pub title: String,
    /// Automation slug.
    pub slug: String,
    /// Current all-time vote total, shown in the digest body.
    pub vote_total: i64,
}

/// Port for notification dispatch.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announce a newly published automation to active "new" subscribers.
    async fn automation_published(&self, announcement: &AutomationAnnouncement);

    /// Send the trending digest to active "trending" subscribers.
    async fn trending_digest(&self, entries: &[TrendingDigestEntry]);
}

/// Notifier that drops every event; used where dispatch is irrelevant.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

#[async_trait]
impl Notifier for SilentNotifier {
    async fn automation_published(&self, _announcement: &AutomationAnnouncement) {}

    async fn trending_digest(&self, _entries: &[TrendingDigestEntry]) {}
}
