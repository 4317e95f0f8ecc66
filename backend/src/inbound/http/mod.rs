//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod automations;
pub mod error;
pub mod health;
pub mod profiles;
pub mod schemas;
pub mod session;
pub mod state;
pub mod subscriptions;
#[cfg(test)]
pub mod test_utils;
pub mod unsubscribe;
pub mod validation;
pub mod votes;

pub use error::ApiResult;

use actix_web::web;

/// Register every `/api/v1` route on a service config.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(automations::trending_automations)
        .service(automations::list_automations)
        .service(automations::create_automation)
        .service(automations::get_automation_by_slug)
        .service(automations::update_automation)
        .service(automations::delete_automation)
        .service(automations::list_own_automations)
        .service(automations::get_automation_for_editing)
        .service(votes::toggle_vote)
        .service(subscriptions::get_subscriptions)
        .service(subscriptions::set_subscription)
        .service(auth::create_session)
        .service(auth::delete_session)
        .service(profiles::get_profile)
        .service(profiles::update_display_name)
        .service(profiles::delete_account);
}
