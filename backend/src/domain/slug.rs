//! Slug derivation for automation titles.
//!
//! Slugs are trimmed, non-empty identifiers composed of lowercase ASCII
//! letters, digits, and hyphens. Collision handling (random and timestamp
//! suffixes) lives with the automation service; this module owns the pure
//! string transforms.

use chrono::{DateTime, Utc};
use rand::Rng;

const BASE36_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Number of characters in a random collision suffix.
pub const RANDOM_SUFFIX_LEN: usize = 4;

/// Derive a URL-safe slug from free-form title text.
///
/// Lowercases, maps every non-alphanumeric run to a single hyphen, and
/// trims hyphens from both edges.
///
/// # Examples
/// ```
/// use poke_community::domain::slug::slugify;
///
/// assert_eq!(slugify("Smart Inbox Routing"), "smart-inbox-routing");
/// assert_eq!(slugify("Team@Scale: Growth+Ops"), "team-scale-growth-ops");
/// assert_eq!(slugify("  Launch --- Plan  "), "launch-plan");
/// ```
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_hyphen = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    slug
}

/// Return `true` when `value` is a valid stored slug.
pub fn is_valid_slug(value: &str) -> bool {
    !value.is_empty()
        && value.trim() == value
        && value
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '-')
}

/// Append a short random base-36 suffix for collision retries.
pub fn with_random_suffix(base: &str, rng: &mut impl Rng) -> String {
    let suffix: String = (0..RANDOM_SUFFIX_LEN)
        .map(|_| {
            let index = rng.gen_range(0..BASE36_ALPHABET.len());
            char::from(BASE36_ALPHABET[index])
        })
        .collect();
    format!("{base}-{suffix}")
}

/// Append a millisecond-timestamp base-36 suffix as the final fallback.
pub fn with_timestamp_suffix(base: &str, now: DateTime<Utc>) -> String {
    format!("{base}-{}", to_base36(now.timestamp_millis().max(0) as u64))
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_owned();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36_ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8(digits).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("Smart Inbox Routing", "smart-inbox-routing")]
    #[case("Team@Scale: Growth+Ops", "team-scale-growth-ops")]
    #[case("  Launch --- Plan  ", "launch-plan")]
    #[case("ALL CAPS", "all-caps")]
    #[case("___", "")]
    fn slugify_cases(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(slugify(input), expected);
    }

    #[rstest]
    #[case("smart-inbox-routing", true)]
    #[case("launch-plan-7", true)]
    #[case("", false)]
    #[case("Upper-Case", false)]
    #[case("has space", false)]
    fn slug_validity(#[case] value: &str, #[case] expected: bool) {
        assert_eq!(is_valid_slug(value), expected);
    }

    #[test]
    fn random_suffix_preserves_validity() {
        let mut rng = rand::thread_rng();
        let value = with_random_suffix("launch-plan", &mut rng);
        assert!(value.starts_with("launch-plan-"));
        assert_eq!(value.len(), "launch-plan-".len() + RANDOM_SUFFIX_LEN);
        assert!(is_valid_slug(&value));
    }

    #[test]
    fn timestamp_suffix_is_deterministic() {
        let now = Utc.with_ymd_and_hms(2025, 7, 20, 12, 0, 0).single().expect("valid time");
        let first = with_timestamp_suffix("launch-plan", now);
        let second = with_timestamp_suffix("launch-plan", now);
        assert_eq!(first, second);
        assert!(is_valid_slug(&first));
    }

    #[rstest]
    #[case(0, "0")]
    #[case(35, "z")]
    #[case(36, "10")]
    fn base36_digits(#[case] value: u64, #[case] expected: &str) {
        assert_eq!(to_base36(value), expected);
    }
}
