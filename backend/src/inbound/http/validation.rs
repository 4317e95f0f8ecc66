//! Shared validation helpers for inbound HTTP adapters.

use serde_json::json;
use std::str::FromStr;

use crate::domain::subscription::SubscriptionCategory;
use crate::domain::vote::{InvalidVoteValue, VoteValue};
use crate::domain::Error;

/// Build an `invalid_request` error with a field detail payload.
pub(crate) fn invalid_field_error(field: &str, message: impl Into<String>, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "value": value,
    }))
}

/// Parse a path or query value that must be one of the two categories.
pub(crate) fn parse_category(raw: &str) -> Result<SubscriptionCategory, Error> {
    SubscriptionCategory::from_str(raw).map_err(|_| {
        invalid_field_error("type", "subscription type must be new or trending", raw)
    })
}

/// Parse a submitted vote value.
pub(crate) fn parse_vote_value(raw: i16) -> Result<VoteValue, Error> {
    VoteValue::try_from(raw).map_err(|InvalidVoteValue(value)| {
        invalid_field_error("value", "vote value must be 1 or -1", &value.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;

    #[test]
    fn categories_parse_strictly() {
        assert_eq!(
            parse_category("trending").expect("valid"),
            SubscriptionCategory::Trending
        );
        let error = parse_category("weekly").expect_err("invalid");
        assert_eq!(error.code(), ErrorCode::InvalidRequest);
        assert_eq!(
            error.details().and_then(|details| details.get("value")),
            Some(&serde_json::json!("weekly"))
        );
    }

    #[test]
    fn vote_values_parse_strictly() {
        assert_eq!(parse_vote_value(1).expect("valid"), VoteValue::Up);
        assert_eq!(parse_vote_value(-1).expect("valid"), VoteValue::Down);
        assert!(parse_vote_value(0).is_err());
        assert!(parse_vote_value(5).is_err());
    }
}
