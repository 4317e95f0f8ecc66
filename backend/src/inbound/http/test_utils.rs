//! Shared fixtures for HTTP handler tests.

use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::Key;

use crate::domain::ports::{
    MockAccountsCommand, MockAccountsQuery, MockAutomationsCommand, MockAutomationsQuery,
    MockSubscriptionsCommand, MockSubscriptionsQuery, MockVotesCommand,
};

use super::state::HttpState;

/// Cookie-session middleware with an ephemeral key for tests.
pub(crate) fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".into())
        .cookie_secure(false)
        .build()
}

/// Port bundle defaulting every port to an expectation-free mock.
///
/// Tests replace the ports they exercise; any unexpected call on the rest
/// panics, which keeps handler tests honest about what they touch.
pub(crate) struct TestPorts {
    pub automations_query: Arc<dyn crate::domain::ports::AutomationsQuery>,
    pub automations_command: Arc<dyn crate::domain::ports::AutomationsCommand>,
    pub votes_command: Arc<dyn crate::domain::ports::VotesCommand>,
    pub subscriptions_query: Arc<dyn crate::domain::ports::SubscriptionsQuery>,
    pub subscriptions_command: Arc<dyn crate::domain::ports::SubscriptionsCommand>,
    pub accounts_query: Arc<dyn crate::domain::ports::AccountsQuery>,
    pub accounts_command: Arc<dyn crate::domain::ports::AccountsCommand>,
}

impl Default for TestPorts {
    fn default() -> Self {
        Self {
            automations_query: Arc::new(MockAutomationsQuery::new()),
            automations_command: Arc::new(MockAutomationsCommand::new()),
            votes_command: Arc::new(MockVotesCommand::new()),
            subscriptions_query: Arc::new(MockSubscriptionsQuery::new()),
            subscriptions_command: Arc::new(MockSubscriptionsCommand::new()),
            accounts_query: Arc::new(MockAccountsQuery::new()),
            accounts_command: Arc::new(MockAccountsCommand::new()),
        }
    }
}

impl TestPorts {
    /// Assemble the HTTP state handlers receive via `web::Data`.
    pub(crate) fn into_state(self) -> HttpState {
        HttpState {
            automations_query: self.automations_query,
            automations_command: self.automations_command,
            votes_command: self.votes_command,
            subscriptions_query: self.subscriptions_query,
            subscriptions_command: self.subscriptions_command,
            accounts_query: self.accounts_query,
            accounts_command: self.accounts_command,
        }
    }
}
