//! Token-authorised one-click unsubscribe endpoints.
//!
//! ```text
//! GET  /unsubscribe/{subscription_id}?type={new|trending}&token={hex}
//! POST /unsubscribe/{subscription_id}?type={new|trending}&token={hex}
//! ```
//!
//! These routes live outside the `/api/v1` scope and require no session:
//! the HMAC token is the authorisation. `GET` serves a human-readable
//! confirmation page for mail-client link clicks; `POST` answers
//! `List-Unsubscribe-Post` one-click requests with a bare status code.

use std::str::FromStr;

use actix_web::{HttpResponse, get, http::StatusCode, post, web};
use serde::Deserialize;
use tracing::warn;

use crate::domain::subscription::{SubscriptionCategory, SubscriptionId};
use crate::domain::{Error, ErrorCode};
use crate::domain::ports::UnsubscribeOutcome;
use crate::inbound::http::state::HttpState;

/// Query parameters on both unsubscribe routes.
#[derive(Debug, Deserialize)]
pub struct UnsubscribeQuery {
    /// Subscription category the link was minted for.
    #[serde(rename = "type")]
    pub category: Option<String>,
    /// Hex HMAC token.
    pub token: Option<String>,
}

enum UnsubscribeReply {
    Done { already_unsubscribed: bool },
    InvalidLink,
    UnknownCategory,
    NotFound,
    Failed,
}

impl UnsubscribeReply {
    fn status(&self) -> StatusCode {
        match self {
            Self::Done { .. } => StatusCode::OK,
            Self::InvalidLink | Self::UnknownCategory => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Failed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn page(&self) -> (&'static str, &'static str) {
        match self {
            Self::Done {
                already_unsubscribed: true,
            } => (
                "You are unsubscribed",
                "You're already unsubscribed from these updates. No further action is needed.",
            ),
            Self::Done { .. } => (
                "You are unsubscribed",
                "You're all set. You won't receive these updates anymore.",
            ),
            Self::InvalidLink => (
                "Invalid unsubscribe link",
                "The unsubscribe link appears to be invalid or has expired. Please request a \
                 new unsubscribe email or adjust your notification preferences from your \
                 profile.",
            ),
            Self::UnknownCategory => (
                "Unknown subscription",
                "We could not determine which subscription you tried to unsubscribe from.",
            ),
            Self::NotFound => (
                "Subscription not found",
                "We could not find a subscription linked to this unsubscribe link. It may \
                 have already been removed.",
            ),
            Self::Failed => (
                "Something went wrong",
                "We were unable to process your unsubscribe request. Please try again later \
                 or contact support.",
            ),
        }
    }
}

async fn process(
    state: &HttpState,
    raw_id: &str,
    query: UnsubscribeQuery,
) -> UnsubscribeReply {
    let Ok(subscription_id) = SubscriptionId::from_str(raw_id) else {
        return UnsubscribeReply::InvalidLink;
    };
    let Some(raw_category) = query.category else {
        return UnsubscribeReply::UnknownCategory;
    };
    let Ok(category) = SubscriptionCategory::from_str(&raw_category) else {
        return UnsubscribeReply::UnknownCategory;
    };
    let token = query.token.unwrap_or_default();

    match state
        .subscriptions_command
        .unsubscribe(&subscription_id, category, &token)
        .await
    {
        Ok(UnsubscribeOutcome::Deactivated) => UnsubscribeReply::Done {
            already_unsubscribed: false,
        },
        Ok(UnsubscribeOutcome::AlreadyInactive) => UnsubscribeReply::Done {
            already_unsubscribed: true,
        },
        Err(error) => reply_for_error(&error),
    }
}

fn reply_for_error(error: &Error) -> UnsubscribeReply {
    match error.code() {
        ErrorCode::InvalidRequest => UnsubscribeReply::InvalidLink,
        ErrorCode::NotFound => UnsubscribeReply::NotFound,
        _ => {
            warn!(error = %error, "unsubscribe request failed");
            UnsubscribeReply::Failed
        }
    }
}

fn html_page(title: &str, body: &str) -> String {
    format!(
        r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <title>{title}</title>
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <style>
      body {{ font-family: system-ui, sans-serif; margin: 0; padding: 32px; background-color: #0f172a; color: #f8fafc; }}
      main {{ max-width: 520px; margin: 0 auto; background: #111827; border-radius: 16px; padding: 32px; }}
      h1 {{ font-size: 1.75rem; margin-bottom: 1rem; }}
      p {{ line-height: 1.6; }}
      a {{ color: #38bdf8; }}
      .status {{ font-size: 0.875rem; opacity: 0.75; margin-top: 1.5rem; }}
    </style>
  </head>
  <body>
    <main>
      <h1>{title}</h1>
      <p>{body}</p>
      <p><a href="/">Return to poke.community</a></p>
      <p class="status">If this wasn't you, you can resubscribe from your profile settings.</p>
    </main>
  </body>
</html>
"#
    )
}

/// Serve the unsubscribe confirmation page for a mail-client link click.
#[get("/unsubscribe/{subscription_id}")]
pub async fn unsubscribe_page(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<UnsubscribeQuery>,
) -> HttpResponse {
    let reply = process(&state, &path.into_inner(), query.into_inner()).await;
    let (title, body) = reply.page();
    HttpResponse::build(reply.status())
        .content_type("text/html; charset=utf-8")
        .body(html_page(title, body))
}

/// Handle a one-click `List-Unsubscribe-Post` request.
#[post("/unsubscribe/{subscription_id}")]
pub async fn unsubscribe_one_click(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<UnsubscribeQuery>,
) -> HttpResponse {
    let reply = process(&state, &path.into_inner(), query.into_inner()).await;
    HttpResponse::build(reply.status()).finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockSubscriptionsCommand;
    use crate::inbound::http::test_utils::TestPorts;
    use actix_web::{App, test};
    use mockall::predicate::eq;
    use std::sync::Arc;

    fn app_ports(command: MockSubscriptionsCommand) -> TestPorts {
        let mut ports = TestPorts::default();
        ports.subscriptions_command = Arc::new(command);
        ports
    }

    #[actix_web::test]
    async fn successful_unsubscribe_serves_a_confirmation_page() {
        let id = SubscriptionId::random();
        let mut command = MockSubscriptionsCommand::new();
        command
            .expect_unsubscribe()
            .with(eq(id), eq(SubscriptionCategory::New), eq("deadbeef"))
            .times(1)
            .return_once(|_, _, _| Ok(UnsubscribeOutcome::Deactivated));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_ports(command).into_state()))
                .service(unsubscribe_page),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/unsubscribe/{id}?type=new&token=deadbeef"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        let body = String::from_utf8(body.to_vec()).expect("utf8 body");
        assert!(body.contains("You are unsubscribed"));
        assert!(body.contains("won't receive these updates"));
    }

    #[actix_web::test]
    async fn repeated_unsubscribe_mentions_the_earlier_opt_out() {
        let id = SubscriptionId::random();
        let mut command = MockSubscriptionsCommand::new();
        command
            .expect_unsubscribe()
            .times(1)
            .return_once(|_, _, _| Ok(UnsubscribeOutcome::AlreadyInactive));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_ports(command).into_state()))
                .service(unsubscribe_page),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/unsubscribe/{id}?type=new&token=deadbeef"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = test::read_body(res).await;
        let body = String::from_utf8(body.to_vec()).expect("utf8 body");
        assert!(body.contains("already unsubscribed"));
    }

    #[actix_web::test]
    async fn invalid_tokens_render_a_bad_request_page() {
        let id = SubscriptionId::random();
        let mut command = MockSubscriptionsCommand::new();
        command
            .expect_unsubscribe()
            .times(1)
            .return_once(|_, _, _| {
                Err(Error::invalid_request("the unsubscribe link is invalid"))
            });

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_ports(command).into_state()))
                .service(unsubscribe_page),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/unsubscribe/{id}?type=new&token=ffff"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn unknown_categories_never_reach_the_service() {
        let id = SubscriptionId::random();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(
                    app_ports(MockSubscriptionsCommand::new()).into_state(),
                ))
                .service(unsubscribe_page),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/unsubscribe/{id}?type=weekly&token=deadbeef"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn one_click_post_answers_with_bare_status_codes() {
        let id = SubscriptionId::random();
        let mut command = MockSubscriptionsCommand::new();
        command
            .expect_unsubscribe()
            .times(1)
            .return_once(|_, _, _| Err(Error::not_found("no subscription")));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_ports(command).into_state()))
                .service(unsubscribe_one_click),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/unsubscribe/{id}?type=trending&token=deadbeef"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body = test::read_body(res).await;
        assert!(body.is_empty());
    }

    #[actix_web::test]
    async fn store_failures_render_a_server_error() {
        let id = SubscriptionId::random();
        let mut command = MockSubscriptionsCommand::new();
        command
            .expect_unsubscribe()
            .times(1)
            .return_once(|_, _, _| Err(Error::service_unavailable()));

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(app_ports(command).into_state()))
                .service(unsubscribe_one_click),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri(&format!("/unsubscribe/{id}?type=new&token=deadbeef"))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
