//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    AccountsCommand, AccountsQuery, AutomationsCommand, AutomationsQuery, SubscriptionsCommand,
    SubscriptionsQuery, VotesCommand,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Catalogue reads.
    pub automations_query: Arc<dyn AutomationsQuery>,
    /// Catalogue writes.
    pub automations_command: Arc<dyn AutomationsCommand>,
    /// Vote toggles.
    pub votes_command: Arc<dyn VotesCommand>,
    /// Subscription reads.
    pub subscriptions_query: Arc<dyn SubscriptionsQuery>,
    /// Subscription writes, including token-authorised unsubscribes.
    pub subscriptions_command: Arc<dyn SubscriptionsCommand>,
    /// Profile reads.
    pub accounts_query: Arc<dyn AccountsQuery>,
    /// Profile writes.
    pub accounts_command: Arc<dyn AccountsCommand>,
}
