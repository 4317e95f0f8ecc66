//! Vote data model and the three-way toggle rule.
//!
//! A user holds at most one vote per automation, valued +1 or -1. Casting
//! the value already held removes the vote; casting the opposite value
//! flips it; casting with no existing vote inserts one. Aggregates are
//! always derived from the vote rows, never stored, so totals cannot
//! drift.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::profile::UserId;

/// Length of the "recent" window used for trending scores, in days.
pub const RECENT_WINDOW_DAYS: i64 = 7;

/// Signed vote magnitude, restricted to the set {-1, +1}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i16", into = "i16")]
pub enum VoteValue {
    /// A +1 vote.
    Up,
    /// A -1 vote.
    Down,
}

impl VoteValue {
    /// The stored integer form of this vote.
    pub fn as_i16(self) -> i16 {
        match self {
            Self::Up => 1,
            Self::Down => -1,
        }
    }
}

impl From<VoteValue> for i16 {
    fn from(value: VoteValue) -> Self {
        value.as_i16()
    }
}

impl TryFrom<i16> for VoteValue {
    type Error = InvalidVoteValue;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Up),
            -1 => Ok(Self::Down),
            other => Err(InvalidVoteValue(other)),
        }
    }
}

/// Error raised when a stored or submitted vote value is outside {-1, +1}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("vote value must be 1 or -1, got {0}")]
pub struct InvalidVoteValue(pub i16);

/// A stored vote row.
#[derive(Debug, Clone, PartialEq)]
pub struct Vote {
    /// Automation the vote applies to.
    pub automation_id: Uuid,
    /// User who cast the vote.
    pub user_id: UserId,
    /// Signed magnitude.
    pub value: VoteValue,
    /// When the vote was first cast.
    pub created_at: DateTime<Utc>,
}

/// Derived per-automation aggregates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VoteStatistics {
    /// Signed sum of all vote values ever cast.
    pub vote_total: i64,
    /// Signed sum of vote values cast within the trailing window.
    pub recent_votes: i64,
}

impl VoteStatistics {
    /// Reduce vote rows into aggregates, windowing `recent_votes` against
    /// `now`.
    pub fn from_votes<'a>(votes: impl IntoIterator<Item = &'a Vote>, now: DateTime<Utc>) -> Self {
        let cutoff = now - Duration::days(RECENT_WINDOW_DAYS);
        let mut stats = Self::default();
        for vote in votes {
            let value = i64::from(vote.value.as_i16());
            stats.vote_total += value;
            if vote.created_at > cutoff {
                stats.recent_votes += value;
            }
        }
        stats
    }
}

/// Outcome of applying the three-way toggle rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteTransition {
    /// No prior vote existed; one was inserted.
    Inserted,
    /// A vote with the opposite value existed; it now carries the new value.
    Flipped,
    /// A vote with the same value existed; it was removed.
    Removed,
}

impl VoteTransition {
    /// The voter's resulting vote after the transition.
    pub fn resulting_vote(self, requested: VoteValue) -> Option<VoteValue> {
        match self {
            Self::Inserted | Self::Flipped => Some(requested),
            Self::Removed => None,
        }
    }
}

/// Decide the three-way toggle transition for a vote cast.
///
/// This is the single decision table shared by the in-memory repository and
/// documented as the contract of the persistence adapter, which realises it
/// with a conditional delete followed by an upsert inside one transaction.
pub fn toggle_transition(existing: Option<VoteValue>, requested: VoteValue) -> VoteTransition {
    match existing {
        None => VoteTransition::Inserted,
        Some(current) if current == requested => VoteTransition::Removed,
        Some(_) => VoteTransition::Flipped,
    }
}
