//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and
//! status codes. Internal errors are redacted before serialisation so
//! store messages never reach clients.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};
use crate::middleware::TraceId;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::Forbidden => StatusCode::FORBIDDEN,
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    if matches!(error.code(), ErrorCode::InternalError) {
        let mut redacted = Error::internal("Internal server error");
        if let Some(id) = error.trace_id() {
            redacted = redacted.with_trace_id(id.to_owned());
        }
        redacted
    } else {
        error.clone()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut payload = self.clone();
        if payload.trace_id().is_none() {
            if let Some(id) = TraceId::current() {
                payload = payload.with_trace_id(id.to_string());
            }
        }

        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = payload.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(redact_if_internal(&payload))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        // Do not leak implementation details to clients.
        error!(error = %err, "actix error promoted to domain error");
        Self::internal("Internal server error")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ErrorCode::InvalidRequest, StatusCode::BAD_REQUEST)]
    #[case(ErrorCode::Unauthorized, StatusCode::UNAUTHORIZED)]
    #[case(ErrorCode::Forbidden, StatusCode::FORBIDDEN)]
    #[case(ErrorCode::NotFound, StatusCode::NOT_FOUND)]
    #[case(ErrorCode::ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE)]
    #[case(ErrorCode::InternalError, StatusCode::INTERNAL_SERVER_ERROR)]
    fn every_code_maps_to_its_status(#[case] code: ErrorCode, #[case] status: StatusCode) {
        assert_eq!(status_for(code), status);
    }

    #[test]
    fn internal_messages_are_redacted() {
        let redacted = redact_if_internal(&Error::internal("database exploded at 10.0.0.3"));
        assert_eq!(redacted.message(), "Internal server error");
    }

    #[test]
    fn non_internal_messages_pass_through() {
        let passed = redact_if_internal(&Error::not_found("automation not found"));
        assert_eq!(passed.message(), "automation not found");
    }

    #[test]
    fn error_response_serialises_the_payload() {
        let response = Error::forbidden("you can only modify automations you created")
            .error_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
