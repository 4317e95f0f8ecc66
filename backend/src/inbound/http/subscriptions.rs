//! Notification subscription HTTP handlers.
//!
//! ```text
//! GET /api/v1/me/subscriptions
//! PUT /api/v1/me/subscriptions/{category}
//! ```

use actix_web::{HttpResponse, get, put, web};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::parse_category;

/// Subscription toggle payload.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubscriptionRequest {
    /// Whether the category should be active.
    pub active: bool,
}

/// The caller's per-category subscription flags.
#[utoipa::path(
    get,
    path = "/api/v1/me/subscriptions",
    responses(
        (status = 200, description = "Per-category flags", body = crate::domain::SubscriptionPreferences),
        (status = 401, description = "Login required", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "getSubscriptions"
)]
#[get("/me/subscriptions")]
pub async fn get_subscriptions(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let user = session.require_user_id()?;
    let preferences = state.subscriptions_query.preferences(&user).await?;
    Ok(HttpResponse::Ok()
        .insert_header(("Cache-Control", "private, must-revalidate, no-cache"))
        .json(preferences))
}

/// Flip one subscription category on or off.
#[utoipa::path(
    put,
    path = "/api/v1/me/subscriptions/{category}",
    params(("category" = String, Path, description = "new or trending")),
    request_body = SubscriptionRequest,
    responses(
        (status = 204, description = "Preference stored"),
        (status = 400, description = "Unknown category", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Login required", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["subscriptions"],
    operation_id = "setSubscription"
)]
#[put("/me/subscriptions/{category}")]
pub async fn set_subscription(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<SubscriptionRequest>,
) -> ApiResult<HttpResponse> {
    let user = session.require_user_id()?;
    let category = parse_category(&path.into_inner())?;
    state
        .subscriptions_command
        .set_subscription(&user, category, payload.active)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::{MockSubscriptionsCommand, MockSubscriptionsQuery};
    use crate::domain::profile::UserId;
    use crate::domain::subscription::{SubscriptionCategory, SubscriptionPreferences};
    use crate::inbound::http::test_utils::{TestPorts, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use mockall::predicate::eq;
    use std::sync::Arc;

    #[actix_web::test]
    async fn preferences_require_a_session() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(TestPorts::default().into_state()))
                .wrap(test_session_middleware())
                .service(get_subscriptions),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/me/subscriptions").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn preferences_serialise_both_flags() {
        let user = UserId::random();
        let mut query = MockSubscriptionsQuery::new();
        query.expect_preferences().times(1).return_once(|_| {
            Ok(SubscriptionPreferences {
                new: true,
                trending: false,
            })
        });

        let mut ports = TestPorts::default();
        ports.subscriptions_query = Arc::new(query);
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
                .service(get_subscriptions),
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
            test::TestRequest::get()
                .uri("/me/subscriptions")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["new"], true);
        assert_eq!(body["trending"], false);
    }

    #[actix_web::test]
    async fn setting_a_category_forwards_the_flag() {
        let user = UserId::random();
        let mut command = MockSubscriptionsCommand::new();
        command
            .expect_set_subscription()
            .with(
                eq(user.clone()),
                eq(SubscriptionCategory::Trending),
                eq(true),
            )
            .times(1)
            .return_once(|_, _, _| Ok(()));

        let mut ports = TestPorts::default();
        ports.subscriptions_command = Arc::new(command);
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
                .service(set_subscription),
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
                .uri("/me/subscriptions/trending")
                .cookie(cookie)
                .set_json(serde_json::json!({ "active": true }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn unknown_categories_are_rejected() {
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
                .service(set_subscription),
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
                .uri("/me/subscriptions/weekly")
                .cookie(cookie)
                .set_json(serde_json::json!({ "active": true }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
