//! Profile settings handlers.
//!
//! ```text
//! GET    /api/v1/me
//! PUT    /api/v1/me/name
//! DELETE /api/v1/me
//! ```

use actix_web::{HttpResponse, delete, get, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Profile;
use crate::domain::profile::DisplayName;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::invalid_field_error;

/// The caller's own profile.
///
/// The email appears here because the caller owns it; it is never joined
/// onto automations other users can see.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    /// User id.
    pub id: String,
    /// Display name, if set.
    pub name: Option<String>,
    /// Avatar reference, if set.
    pub avatar_url: Option<String>,
    /// The caller's own email address.
    pub email: String,
}

impl From<Profile> for ProfileResponse {
    fn from(value: Profile) -> Self {
        Self {
            id: value.id.to_string(),
            name: value.name.map(String::from),
            avatar_url: value.avatar_url,
            email: value.email.to_string(),
        }
    }
}

/// Display-name update payload; blank or missing clears the name.
#[derive(Debug, Deserialize, ToSchema)]
pub struct NameRequest {
    /// New display name.
    pub name: Option<String>,
}

/// Fetch the caller's profile.
#[utoipa::path(
    get,
    path = "/api/v1/me",
    responses(
        (status = 200, description = "Own profile", body = ProfileResponse),
        (status = 401, description = "Login required", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Profile missing", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "getProfile"
)]
#[get("/me")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user = session.require_user_id()?;
    let profile = state.accounts_query.profile(&user).await?;
    Ok(HttpResponse::Ok()
        .insert_header(("Cache-Control", "private, must-revalidate, no-cache"))
        .json(ProfileResponse::from(profile)))
}

/// Replace or clear the caller's display name.
#[utoipa::path(
    put,
    path = "/api/v1/me/name",
    request_body = NameRequest,
    responses(
        (status = 204, description = "Name stored"),
        (status = 400, description = "Name fails validation", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Login required", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "updateDisplayName"
)]
#[put("/me/name")]
pub async fn update_display_name(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<NameRequest>,
) -> ApiResult<HttpResponse> {
    let user = session.require_user_id()?;
    let raw = payload.into_inner().name.unwrap_or_default();
    let name = DisplayName::from_form_value(&raw)
        .map_err(|err| invalid_field_error("name", err.to_string(), &raw))?;
    state
        .accounts_command
        .update_display_name(&user, name)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Delete the caller's account, cascading automations, votes, and
/// subscriptions, then clear the session.
#[utoipa::path(
    delete,
    path = "/api/v1/me",
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Login required", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["profiles"],
    operation_id = "deleteAccount"
)]
#[delete("/me")]
pub async fn delete_account(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user = session.require_user_id()?;
    state.accounts_command.delete_account(&user).await?;
    session.clear();
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockAccountsCommand;
    use crate::domain::profile::UserId;
    use crate::inbound::http::test_utils::{TestPorts, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use std::sync::Arc;

    #[actix_web::test]
    async fn profile_requires_a_session() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(TestPorts::default().into_state()))
                .wrap(test_session_middleware())
                .service(get_profile),
        )
        .await;

        let res = test::call_service(&app, test::TestRequest::get().uri("/me").to_request()).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn blank_names_clear_and_valid_names_store() {
        let user = UserId::random();
        let mut accounts = MockAccountsCommand::new();
        accounts
            .expect_update_display_name()
            .withf(|_, name| name.as_ref().map(AsRef::as_ref) == Some("Casey"))
            .times(1)
            .return_once(|_, _| Ok(()));
        accounts
            .expect_update_display_name()
            .withf(|_, name| name.is_none())
            .times(1)
            .return_once(|_, _| Ok(()));

        let mut ports = TestPorts::default();
        ports.accounts_command = Arc::new(accounts);
        let session_user = user.clone();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(ports.into_state()))
                .wrap(test_session_middleware())
                .route(
                    "/login",
                    web::get().to(move |session: SessionContext| {
                        let user = session_user.clone();
                        async move {
                            session.persist_user(&user)?;
                            Ok::<_, crate::domain::Error>(HttpResponse::Ok().finish())
                        }
                    }),
                )
                .service(update_display_name),
        )
        .await;

        let login =
            test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
        let cookie = login
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie")
            .into_owned();

        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/me/name")
                .cookie(cookie.clone())
                .set_json(serde_json::json!({ "name": "Casey" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);

        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/me/name")
                .cookie(cookie)
                .set_json(serde_json::json!({ "name": "  " }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn too_short_names_are_rejected() {
        let user = UserId::random();
        let session_user = user.clone();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(TestPorts::default().into_state()))
                .wrap(test_session_middleware())
                .route(
                    "/login",
                    web::get().to(move |session: SessionContext| {
                        let user = session_user.clone();
                        async move {
                            session.persist_user(&user)?;
                            Ok::<_, crate::domain::Error>(HttpResponse::Ok().finish())
                        }
                    }),
                )
                .service(update_display_name),
        )
        .await;

        let login =
            test::call_service(&app, test::TestRequest::get().uri("/login").to_request()).await;
        let cookie = login
            .response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .expect("session cookie");

        let res = test::call_service(
            &app,
            test::TestRequest::put()
                .uri("/me/name")
                .cookie(cookie)
                .set_json(serde_json::json!({ "name": "x" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
