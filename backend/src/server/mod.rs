//! Server assembly: configuration, adapter wiring, and session middleware.

pub mod config;

use std::sync::Arc;

use actix_session::SessionMiddleware;
use actix_session::storage::CookieSessionStore;
use actix_web::cookie::{Key, SameSite};
use tracing::warn;

use crate::domain::ports::{DisabledMailer, Mailer};
use crate::domain::{
    AccountsService, AutomationsService, EmailNotifier, SubscriptionsService,
    UnsubscribeTokenService,
};
use crate::inbound::http::state::HttpState;
use crate::outbound::email::ResendMailer;
use crate::outbound::persistence::{
    DbPool, DieselAutomationRepository, DieselProfileRepository, DieselSubscriptionRepository,
    DieselVoteRepository,
};

pub use config::{AppConfig, ConfigError};

/// Wire the Diesel adapters and domain services into the HTTP state.
///
/// # Errors
///
/// Returns an error when the Resend HTTP client cannot be constructed.
pub fn build_http_state(pool: DbPool, config: AppConfig) -> Result<HttpState, reqwest::Error> {
    let automations = Arc::new(DieselAutomationRepository::new(pool.clone()));
    let votes = Arc::new(DieselVoteRepository::new(pool.clone()));
    let subscriptions = Arc::new(DieselSubscriptionRepository::new(pool.clone()));
    let profiles = Arc::new(DieselProfileRepository::new(pool));

    let tokens = Arc::new(UnsubscribeTokenService::new(Some(
        config.unsubscribe_secret,
    )));
    let mailer: Arc<dyn Mailer> = match config.resend_api_key {
        Some(key) => Arc::new(ResendMailer::new(key)?),
        None => {
            warn!("RESEND_API_KEY unset; notification emails are disabled");
            Arc::new(DisabledMailer)
        }
    };
    let notifier = Arc::new(EmailNotifier::new(
        Arc::clone(&subscriptions),
        mailer,
        Arc::clone(&tokens),
        config.site_url,
    ));

    let automations_service = Arc::new(AutomationsService::new(automations, votes, notifier));
    let subscriptions_service = Arc::new(SubscriptionsService::new(subscriptions, tokens));
    let accounts_service = Arc::new(AccountsService::new(profiles));

    Ok(HttpState {
        automations_query: automations_service.clone(),
        automations_command: automations_service.clone(),
        votes_command: automations_service,
        subscriptions_query: subscriptions_service.clone(),
        subscriptions_command: subscriptions_service,
        accounts_query: accounts_service.clone(),
        accounts_command: accounts_service,
    })
}

/// Cookie-session middleware shared by the server and its tests.
pub fn session_middleware(key: Key, cookie_secure: bool) -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_same_site(SameSite::Lax)
        .build()
}
