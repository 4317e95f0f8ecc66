//! Session establishment handlers.
//!
//! Authentication itself is the external provider's business; by the time
//! a request reaches this adapter the identity has been verified upstream.
//! Establishing a session upserts the profile row (so sign-ins lazily
//! materialise profiles) and persists the user id in the session cookie.
//!
//! ```text
//! POST   /api/v1/auth/session
//! DELETE /api/v1/auth/session
//! ```

use actix_web::{HttpResponse, delete, post, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::profile::{DisplayName, EmailAddress, SessionIdentity, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::profiles::ProfileResponse;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::invalid_field_error;

/// Verified identity payload from the authentication callback.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    /// Stable user id issued by the provider.
    pub user_id: String,
    /// Verified email address.
    pub email: String,
    /// Display name supplied by the provider, if any.
    pub name: Option<String>,
    /// Avatar reference supplied by the provider, if any.
    pub avatar_url: Option<String>,
}

fn parse_identity(payload: SessionRequest) -> Result<SessionIdentity, crate::domain::Error> {
    let user_id = UserId::new(&payload.user_id)
        .map_err(|_| invalid_field_error("userId", "user id must be a UUID", &payload.user_id))?;
    let email = EmailAddress::new(&payload.email)
        .map_err(|_| invalid_field_error("email", "email address is not valid", &payload.email))?;
    // Provider names that fail validation degrade to "unset" rather than
    // blocking sign-in.
    let name = payload
        .name
        .as_deref()
        .and_then(|raw| DisplayName::from_form_value(raw).ok().flatten());
    Ok(SessionIdentity {
        user_id,
        email,
        name,
        avatar_url: payload.avatar_url,
    })
}

/// Establish a session for an externally authenticated identity.
#[utoipa::path(
    post,
    path = "/api/v1/auth/session",
    request_body = SessionRequest,
    responses(
        (status = 200, description = "Session established", body = ProfileResponse),
        (status = 400, description = "Invalid identity payload", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["auth"],
    operation_id = "createSession"
)]
#[post("/auth/session")]
pub async fn create_session(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<SessionRequest>,
) -> ApiResult<HttpResponse> {
    let identity = parse_identity(payload.into_inner())?;
    let profile = state.accounts_command.establish_profile(&identity).await?;
    session.persist_user(&profile.id)?;
    Ok(HttpResponse::Ok().json(ProfileResponse::from(profile)))
}

/// Clear the session, signing the caller out.
#[utoipa::path(
    delete,
    path = "/api/v1/auth/session",
    responses((status = 204, description = "Session cleared")),
    tags = ["auth"],
    operation_id = "deleteSession"
)]
#[delete("/auth/session")]
pub async fn delete_session(session: SessionContext) -> ApiResult<HttpResponse> {
    session.clear();
    Ok(HttpResponse::NoContent().finish())
}
