//! OpenAPI document assembled from the annotated handlers.

use utoipa::OpenApi;

/// Public OpenAPI surface used by Swagger UI and tooling.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "poke.community API",
        description = "Community-curated automation recipes: browse, search, vote, subscribe."
    ),
    paths(
        crate::inbound::http::automations::list_automations,
        crate::inbound::http::automations::trending_automations,
        crate::inbound::http::automations::get_automation_by_slug,
        crate::inbound::http::automations::create_automation,
        crate::inbound::http::automations::update_automation,
        crate::inbound::http::automations::delete_automation,
        crate::inbound::http::automations::list_own_automations,
        crate::inbound::http::automations::get_automation_for_editing,
        crate::inbound::http::votes::toggle_vote,
        crate::inbound::http::subscriptions::get_subscriptions,
        crate::inbound::http::subscriptions::set_subscription,
        crate::inbound::http::auth::create_session,
        crate::inbound::http::auth::delete_session,
        crate::inbound::http::profiles::get_profile,
        crate::inbound::http::profiles::update_display_name,
        crate::inbound::http::profiles::delete_account,
    ),
    components(schemas(
        crate::inbound::http::automations::AutomationFormRequest,
        crate::inbound::http::automations::AutomationListingResponse,
        crate::inbound::http::automations::AutomationResponse,
        crate::inbound::http::automations::AuthorResponse,
        crate::inbound::http::automations::CreatedResponse,
        crate::inbound::http::votes::VoteRequest,
        crate::inbound::http::votes::VoteReceiptResponse,
        crate::inbound::http::subscriptions::SubscriptionRequest,
        crate::inbound::http::auth::SessionRequest,
        crate::inbound::http::profiles::NameRequest,
        crate::inbound::http::profiles::ProfileResponse,
        crate::inbound::http::schemas::ErrorSchema,
        crate::domain::SubscriptionPreferences,
    )),
    tags(
        (name = "automations", description = "Browse, submit, and manage automations"),
        (name = "votes", description = "Three-way vote toggles"),
        (name = "subscriptions", description = "Notification preferences"),
        (name = "auth", description = "Session establishment"),
        (name = "profiles", description = "Account settings")
    )
)]
pub struct ApiDoc;
