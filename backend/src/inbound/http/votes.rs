//! Vote toggle HTTP handler.
//!
//! ```text
//! POST /api/v1/automations/{id}/vote
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use utoipa::ToSchema;

use crate::domain::automation::AutomationId;
use crate::domain::ports::VoteReceipt;
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{invalid_field_error, parse_vote_value};

/// Vote toggle payload.
#[derive(Debug, Deserialize, ToSchema)]
pub struct VoteRequest {
    /// Signed vote value: 1 or -1.
    pub value: i16,
}

/// Fresh vote state after a toggle.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceiptResponse {
    /// The caller's resulting vote: 1, -1, or 0 after un-voting.
    pub user_vote: i16,
    /// All-time signed vote total.
    pub vote_total: i64,
    /// Signed vote total over the trailing seven days.
    pub recent_votes: i64,
}

impl From<VoteReceipt> for VoteReceiptResponse {
    fn from(value: VoteReceipt) -> Self {
        Self {
            user_vote: value.viewer_vote,
            vote_total: value.statistics.vote_total,
            recent_votes: value.statistics.recent_votes,
        }
    }
}

/// Toggle the caller's vote on one automation.
///
/// Casting the value already held removes the vote; the opposite value
/// flips it; a fresh value inserts it.
#[utoipa::path(
    post,
    path = "/api/v1/automations/{id}/vote",
    params(("id" = String, Path, description = "Automation id")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Vote state after the toggle", body = VoteReceiptResponse),
        (status = 400, description = "Invalid vote value", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 401, description = "Login required", body = crate::inbound::http::schemas::ErrorSchema),
        (status = 404, description = "Unknown automation", body = crate::inbound::http::schemas::ErrorSchema)
    ),
    tags = ["votes"],
    operation_id = "toggleVote"
)]
#[post("/automations/{id}/vote")]
pub async fn toggle_vote(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<VoteRequest>,
) -> ApiResult<HttpResponse> {
    let actor = session.require_user_id()?;
    let raw_id = path.into_inner();
    let id = AutomationId::from_str(&raw_id)
        .map_err(|_| invalid_field_error("id", "automation id must be a UUID", &raw_id))?;
    let value = parse_vote_value(payload.value)?;

    let receipt = state.votes_command.toggle_vote(&actor, &id, value).await?;
    Ok(HttpResponse::Ok().json(VoteReceiptResponse::from(receipt)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockVotesCommand;
    use crate::domain::profile::UserId;
    use crate::domain::vote::{VoteStatistics, VoteValue};
    use crate::inbound::http::test_utils::{TestPorts, test_session_middleware};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use mockall::predicate::eq;
    use std::sync::Arc;

    fn app_with(votes: MockVotesCommand, user: UserId) -> (TestPorts, UserId) {
        let mut ports = TestPorts::default();
        ports.votes_command = Arc::new(votes);
        (ports, user)
    }

    #[actix_web::test]
    async fn anonymous_votes_are_unauthorised() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(TestPorts::default().into_state()))
                .wrap(test_session_middleware())
                .service(toggle_vote),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!(
                    "/automations/{}/vote",
                    AutomationId::random()
                ))
                .set_json(serde_json::json!({ "value": 1 }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn toggle_returns_the_fresh_state() {
        let user = UserId::random();
        let automation = AutomationId::random();
        let mut votes = MockVotesCommand::new();
        votes
            .expect_toggle_vote()
            .with(eq(user.clone()), eq(automation), eq(VoteValue::Up))
            .times(1)
            .return_once(|_, _, _| {
                Ok(VoteReceipt {
                    viewer_vote: 1,
                    statistics: VoteStatistics {
                        vote_total: 4,
                        recent_votes: 2,
                    },
                })
            });

        let (ports, user) = app_with(votes, user);
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
                .service(toggle_vote),
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
            test::TestRequest::post()
                .uri(&format!("/automations/{automation}/vote"))
                .cookie(cookie)
                .set_json(serde_json::json!({ "value": 1 }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["userVote"], 1);
        assert_eq!(body["voteTotal"], 4);
        assert_eq!(body["recentVotes"], 2);
    }

    #[actix_web::test]
    async fn out_of_range_vote_values_are_rejected() {
        let user = UserId::random();
        let (ports, user) = app_with(MockVotesCommand::new(), user);
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
                .service(toggle_vote),
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
            test::TestRequest::post()
                .uri(&format!("/automations/{}/vote", AutomationId::random()))
                .cookie(cookie)
                .set_json(serde_json::json!({ "value": 3 }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
