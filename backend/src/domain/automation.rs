//! Automation data model and submission-form validation.
//!
//! An automation is a community-submitted recipe: a title, a one-line
//! summary, an optional long-form markdown description, the prompt text
//! users copy, and a free-form tag list. Every automation carries a unique
//! URL-safe slug derived from its title.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::UserId;

/// Minimum title length, in characters.
pub const TITLE_MIN: usize = 4;
/// Maximum title length, in characters.
pub const TITLE_MAX: usize = 120;
/// Maximum summary length, in characters.
pub const SUMMARY_MAX: usize = 180;
/// Maximum description length, in characters.
pub const DESCRIPTION_MAX: usize = 8000;

/// Stable automation identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AutomationId(Uuid);

impl AutomationId {
    /// Wrap an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for AutomationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AutomationId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Stored automation row.
#[derive(Debug, Clone, PartialEq)]
pub struct Automation {
    /// Row identifier.
    pub id: AutomationId,
    /// Owning user; the only identity allowed to mutate or delete the row.
    pub user_id: UserId,
    /// Display title, [`TITLE_MIN`]..=[`TITLE_MAX`] characters.
    pub title: String,
    /// One-line summary shown on cards.
    pub summary: Option<String>,
    /// Long-form markdown description.
    pub description: Option<String>,
    /// The payload users copy into their own setup.
    pub prompt: String,
    /// Normalised lowercase tags.
    pub tags: Vec<String>,
    /// Unique URL-safe slug derived from the title.
    pub slug: String,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Raw submission-form fields, exactly as posted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AutomationForm {
    /// Title field.
    pub title: String,
    /// Summary field.
    pub summary: String,
    /// Markdown description field.
    pub description: String,
    /// Prompt field.
    pub prompt: String,
    /// Comma-separated tag list.
    pub tags: String,
}

/// Validated and normalised submission fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutomationDraft {
    /// Trimmed title.
    pub title: String,
    /// Trimmed summary.
    pub summary: String,
    /// Trimmed description; blank input becomes `None`.
    pub description: Option<String>,
    /// Trimmed prompt.
    pub prompt: String,
    /// Parsed lowercase tags, empties dropped.
    pub tags: Vec<String>,
}

/// Per-field validation messages, keyed by form field name.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Validate and normalise a submission form.
///
/// Returns every failing field with its message so the caller can render
/// the whole form state at once rather than stopping at the first error.
pub fn validate_form(form: &AutomationForm) -> Result<AutomationDraft, FieldErrors> {
    let title = form.title.trim();
    let summary = form.summary.trim();
    let description = form.description.trim();
    let prompt = form.prompt.trim();

    let mut errors = FieldErrors::new();
    let title_len = title.chars().count();
    if title_len < TITLE_MIN {
        errors.insert(
            "title",
            format!("Title must be at least {TITLE_MIN} characters long."),
        );
    } else if title_len > TITLE_MAX {
        errors.insert("title", format!("Title cannot exceed {TITLE_MAX} characters."));
    }
    if summary.is_empty() {
        errors.insert("summary", "Summary is required.".to_owned());
    } else if summary.chars().count() > SUMMARY_MAX {
        errors.insert(
            "summary",
            format!("Summary cannot exceed {SUMMARY_MAX} characters."),
        );
    }
    if description.chars().count() > DESCRIPTION_MAX {
        errors.insert(
            "description",
            format!("Description cannot exceed {DESCRIPTION_MAX} characters."),
        );
    }
    if prompt.is_empty() {
        errors.insert("prompt", "Prompt is required.".to_owned());
    }

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(AutomationDraft {
        title: title.to_owned(),
        summary: summary.to_owned(),
        description: (!description.is_empty()).then(|| description.to_owned()),
        prompt: prompt.to_owned(),
        tags: parse_tags(&form.tags),
    })
}

/// Split a comma-separated tag field into normalised lowercase tags.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Case-insensitive free-text match over an automation's searchable fields.
///
/// Mirrors the store-side predicate so in-memory fixtures rank and filter
/// identically to the SQL adapter.
pub fn matches_search(automation: &Automation, term: &str) -> bool {
    let needle = term.to_lowercase();
    let contains = |field: &str| field.to_lowercase().contains(&needle);
    contains(&automation.title)
        || automation.summary.as_deref().is_some_and(contains)
        || automation.description.as_deref().is_some_and(contains)
        || contains(&automation.prompt)
        || automation.tags.iter().any(|tag| tag == &needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn valid_form() -> AutomationForm {
        AutomationForm {
            title: "Smart Inbox Routing".to_owned(),
            summary: "Routes incoming mail to the right place.".to_owned(),
            description: "Longer markdown body.".to_owned(),
            prompt: "When a mail arrives, triage it.".to_owned(),
            tags: "Email, Productivity, ,routing".to_owned(),
        }
    }

    fn automation_with(title: &str, tags: &[&str]) -> Automation {
        Automation {
            id: AutomationId::random(),
            user_id: UserId::random(),
            title: title.to_owned(),
            summary: Some("Keeps the inbox tidy".to_owned()),
            description: None,
            prompt: "Do the thing".to_owned(),
            tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
            slug: "fixture".to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn valid_form_normalises_fields() {
        let draft = validate_form(&valid_form()).expect("valid form");
        assert_eq!(draft.title, "Smart Inbox Routing");
        assert_eq!(draft.tags, vec!["email", "productivity", "routing"]);
        assert_eq!(draft.description.as_deref(), Some("Longer markdown body."));
    }

    #[test]
    fn blank_description_becomes_none() {
        let mut form = valid_form();
        form.description = "   ".to_owned();
        let draft = validate_form(&form).expect("valid form");
        assert_eq!(draft.description, None);
    }

    #[rstest]
    #[case("abc", "title")]
    #[case("a", "title")]
    fn short_title_is_rejected(#[case] title: &str, #[case] field: &'static str) {
        let mut form = valid_form();
        form.title = title.to_owned();
        let errors = validate_form(&form).expect_err("invalid form");
        assert!(errors.contains_key(field));
    }

    #[test]
    fn oversized_fields_are_rejected_per_field() {
        let mut form = valid_form();
        form.title = "t".repeat(TITLE_MAX + 1);
        form.summary = "s".repeat(SUMMARY_MAX + 1);
        form.description = "d".repeat(DESCRIPTION_MAX + 1);
        form.prompt = "  ".to_owned();

        let errors = validate_form(&form).expect_err("invalid form");
        assert_eq!(errors.len(), 4);
        assert!(errors.contains_key("title"));
        assert!(errors.contains_key("summary"));
        assert!(errors.contains_key("description"));
        assert!(errors.contains_key("prompt"));
    }

    #[test]
    fn missing_summary_and_prompt_are_required() {
        let mut form = valid_form();
        form.summary = String::new();
        form.prompt = String::new();
        let errors = validate_form(&form).expect_err("invalid form");
        assert_eq!(errors.get("summary").map(String::as_str), Some("Summary is required."));
        assert_eq!(errors.get("prompt").map(String::as_str), Some("Prompt is required."));
    }

    #[rstest]
    #[case("routing", true)]
    #[case("ROUTING", true)]
    #[case("tidy", true)]
    #[case("sorcery", false)]
    fn search_matches_title_summary_and_tags(#[case] term: &str, #[case] expected: bool) {
        let automation = automation_with("Smart Inbox Routing", &["email"]);
        assert_eq!(matches_search(&automation, term), expected);
    }

    #[test]
    fn tag_match_is_exact_membership() {
        let automation = automation_with("Growth Ops", &["email"]);
        assert!(matches_search(&automation, "Email"));
        assert!(!matches_search(&automation, "mail"));
    }
}
