//! Notification subscription data model.
//!
//! A user opts into at most one subscription row per category. Absence of a
//! row is equivalent to an inactive subscription; rows are created lazily on
//! first opt-in and flipped thereafter, never hard-deleted outside account
//! deletion.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::UserId;

/// Notification categories a user can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionCategory {
    /// Announcement email for every newly published automation.
    New,
    /// Weekly digest of the automations with the highest recent velocity.
    Trending,
}

impl SubscriptionCategory {
    /// All known categories, in a stable order.
    pub const ALL: [Self; 2] = [Self::New, Self::Trending];

    /// The stored string form of this category.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Trending => "trending",
        }
    }
}

impl fmt::Display for SubscriptionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when a stored or submitted category is unknown.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown subscription category: {0}")]
pub struct UnknownSubscriptionCategory(pub String);

impl FromStr for SubscriptionCategory {
    type Err = UnknownSubscriptionCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(Self::New),
            "trending" => Ok(Self::Trending),
            other => Err(UnknownSubscriptionCategory(other.to_owned())),
        }
    }
}

/// Stable subscription identifier, embedded in unsubscribe links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
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

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SubscriptionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Stored subscription row.
#[derive(Debug, Clone, PartialEq)]
pub struct Subscription {
    /// Row identifier (the one unsubscribe links reference).
    pub id: SubscriptionId,
    /// Owning user.
    pub user_id: UserId,
    /// Notification category.
    pub category: SubscriptionCategory,
    /// Whether the subscription is currently active.
    pub active: bool,
    /// Row creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last flip timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Per-user subscription preferences, one flag per category.
///
/// Categories with no stored row read as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionPreferences {
    /// Whether announcement emails are active.
    pub new: bool,
    /// Whether the trending digest is active.
    pub trending: bool,
}

impl SubscriptionPreferences {
    /// Fold `(category, active)` pairs into a preference set.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (SubscriptionCategory, bool)>) -> Self {
        let mut preferences = Self::default();
        for (category, active) in pairs {
            preferences.set(category, active);
        }
        preferences
    }

    /// Read the flag for one category.
    pub fn get(&self, category: SubscriptionCategory) -> bool {
        match category {
            SubscriptionCategory::New => self.new,
            SubscriptionCategory::Trending => self.trending,
        }
    }

    /// Set the flag for one category.
    pub fn set(&mut self, category: SubscriptionCategory, active: bool) {
        match category {
            SubscriptionCategory::New => self.new = active,
            SubscriptionCategory::Trending => self.trending = active,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("new", Ok(SubscriptionCategory::New))]
    #[case("trending", Ok(SubscriptionCategory::Trending))]
    #[case("NEW", Err(UnknownSubscriptionCategory("NEW".to_owned())))]
    #[case("weekly", Err(UnknownSubscriptionCategory("weekly".to_owned())))]
    fn category_parsing_is_strict(
        #[case] raw: &str,
        #[case] expected: Result<SubscriptionCategory, UnknownSubscriptionCategory>,
    ) {
        assert_eq!(raw.parse::<SubscriptionCategory>(), expected);
    }

    #[test]
    fn category_round_trips_string_form() {
        for category in SubscriptionCategory::ALL {
            assert_eq!(
                category.as_str().parse::<SubscriptionCategory>(),
                Ok(category)
            );
        }
    }

    #[test]
    fn preferences_default_to_inactive() {
        let preferences = SubscriptionPreferences::default();
        assert!(!preferences.get(SubscriptionCategory::New));
        assert!(!preferences.get(SubscriptionCategory::Trending));
    }

    #[test]
    fn preferences_fold_from_pairs() {
        let preferences = SubscriptionPreferences::from_pairs([
            (SubscriptionCategory::New, true),
            (SubscriptionCategory::Trending, false),
        ]);
        assert!(preferences.new);
        assert!(!preferences.trending);
    }
}
