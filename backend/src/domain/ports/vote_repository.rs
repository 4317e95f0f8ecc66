//! Port for vote persistence and aggregation.
//!
//! The toggle mutation is atomic at the adapter level: a conditional
//! delete followed by an upsert inside one transaction, so two concurrent
//! casts for the same (user, automation) pair can never produce two rows.
//! Aggregates are derived live from the vote rows on every read.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::profile::UserId;
use crate::domain::vote::{
    Vote, VoteStatistics, VoteTransition, VoteValue, toggle_transition,
};

/// Errors raised by vote repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VoteRepositoryError {
    /// Repository connection could not be established.
    #[error("vote repository connection failed: {message}")]
    Connection {
        /// Underlying transport message.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("vote repository query failed: {message}")]
    Query {
        /// Underlying store message.
        message: String,
    },
}

impl VoteRepositoryError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Port for vote storage, the three-way toggle, and derived aggregates.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Apply the three-way toggle for `(automation, user, value)` and
    /// report which transition happened.
    async fn toggle(
        &self,
        automation_id: Uuid,
        user_id: &UserId,
        value: VoteValue,
    ) -> Result<VoteTransition, VoteRepositoryError>;

    /// Derive `vote_total` and `recent_votes` for each requested
    /// automation. Automations with no votes are absent from the map.
    async fn statistics_for(
        &self,
        automation_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, VoteStatistics>, VoteRepositoryError>;

    /// Fetch the votes one user has cast across the requested automations.
    async fn cast_by_user(
        &self,
        user_id: &UserId,
        automation_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, VoteValue>, VoteRepositoryError>;
}

/// In-memory implementation backed by a mutex-guarded row list.
///
/// Implements the exact toggle and windowing semantics of the SQL adapter,
/// which makes it the reference harness for vote-sequence tests.
#[derive(Debug, Default)]
pub struct InMemoryVoteRepository {
    rows: Mutex<Vec<Vote>>,
}

impl InMemoryVoteRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a vote row directly, bypassing the toggle rule.
    pub fn seed(&self, vote: Vote) {
        let mut rows = self.rows.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        rows.push(vote);
    }
}

#[async_trait]
impl VoteRepository for InMemoryVoteRepository {
    async fn toggle(
        &self,
        automation_id: Uuid,
        user_id: &UserId,
        value: VoteValue,
    ) -> Result<VoteTransition, VoteRepositoryError> {
        let mut rows = self.rows.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let existing_index = rows
            .iter()
            .position(|row| row.automation_id == automation_id && &row.user_id == user_id);
        let existing_value = existing_index.and_then(|index| rows.get(index).map(|row| row.value));

        let transition = toggle_transition(existing_value, value);
        match (transition, existing_index) {
            (VoteTransition::Removed, Some(index)) => {
                rows.remove(index);
            }
            (VoteTransition::Flipped, Some(index)) => {
                if let Some(row) = rows.get_mut(index) {
                    row.value = value;
                }
            }
            _ => {
                rows.push(Vote {
                    automation_id,
                    user_id: user_id.clone(),
                    value,
                    created_at: Utc::now(),
                });
            }
        }
        Ok(transition)
    }

    async fn statistics_for(
        &self,
        automation_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, VoteStatistics>, VoteRepositoryError> {
        let rows = self.rows.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        let now = Utc::now();
        let mut statistics = HashMap::new();
        for id in automation_ids {
            let votes: Vec<&Vote> = rows.iter().filter(|row| row.automation_id == *id).collect();
            if votes.is_empty() {
                continue;
            }
            statistics.insert(*id, VoteStatistics::from_votes(votes.into_iter(), now));
        }
        Ok(statistics)
    }

    async fn cast_by_user(
        &self,
        user_id: &UserId,
        automation_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, VoteValue>, VoteRepositoryError> {
        let rows = self.rows.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        Ok(rows
            .iter()
            .filter(|row| &row.user_id == user_id && automation_ids.contains(&row.automation_id))
            .map(|row| (row.automation_id, row.value))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use crate::domain::vote::RECENT_WINDOW_DAYS;

    async fn total_for(repo: &InMemoryVoteRepository, id: Uuid) -> i64 {
        repo.statistics_for(&[id])
            .await
            .expect("statistics")
            .get(&id)
            .copied()
            .unwrap_or_default()
            .vote_total
    }

    #[tokio::test]
    async fn casting_same_value_twice_nets_to_zero() {
        let repo = InMemoryVoteRepository::new();
        let automation = Uuid::new_v4();
        let user = UserId::random();

        let first = repo.toggle(automation, &user, VoteValue::Up).await.expect("toggle");
        assert_eq!(first, VoteTransition::Inserted);
        assert_eq!(total_for(&repo, automation).await, 1);

        let second = repo.toggle(automation, &user, VoteValue::Up).await.expect("toggle");
        assert_eq!(second, VoteTransition::Removed);
        assert_eq!(total_for(&repo, automation).await, 0);
    }

    #[tokio::test]
    async fn flipping_swings_the_total_by_two() {
        let repo = InMemoryVoteRepository::new();
        let automation = Uuid::new_v4();
        let user = UserId::random();

        repo.toggle(automation, &user, VoteValue::Up).await.expect("toggle");
        let flipped = repo
            .toggle(automation, &user, VoteValue::Down)
            .await
            .expect("toggle");
        assert_eq!(flipped, VoteTransition::Flipped);
        assert_eq!(total_for(&repo, automation).await, -1);
    }

    #[tokio::test]
    async fn down_toggle_sequence_returns_to_baseline() {
        // From neutral: -1 lands at -1, -1 again toggles off, +1 lands at +1.
        let repo = InMemoryVoteRepository::new();
        let automation = Uuid::new_v4();
        let user = UserId::random();

        repo.toggle(automation, &user, VoteValue::Down).await.expect("toggle");
        assert_eq!(total_for(&repo, automation).await, -1);
        repo.toggle(automation, &user, VoteValue::Down).await.expect("toggle");
        assert_eq!(total_for(&repo, automation).await, 0);
        repo.toggle(automation, &user, VoteValue::Up).await.expect("toggle");
        assert_eq!(total_for(&repo, automation).await, 1);
    }

    #[tokio::test]
    async fn one_row_per_user_pair_holds_across_retries() {
        let repo = InMemoryVoteRepository::new();
        let automation = Uuid::new_v4();
        let user = UserId::random();

        for value in [VoteValue::Up, VoteValue::Down, VoteValue::Up, VoteValue::Up] {
            repo.toggle(automation, &user, value).await.expect("toggle");
        }
        let total = total_for(&repo, automation).await;
        assert!(total.abs() <= 1, "never more than one row per pair");
    }

    #[tokio::test]
    async fn statistics_window_excludes_old_votes() {
        let repo = InMemoryVoteRepository::new();
        let automation = Uuid::new_v4();
        repo.seed(Vote {
            automation_id: automation,
            user_id: UserId::random(),
            value: VoteValue::Up,
            created_at: Utc::now() - Duration::days(RECENT_WINDOW_DAYS + 1),
        });
        repo.seed(Vote {
            automation_id: automation,
            user_id: UserId::random(),
            value: VoteValue::Up,
            created_at: Utc::now(),
        });

        let statistics = repo.statistics_for(&[automation]).await.expect("statistics");
        let entry = statistics.get(&automation).expect("present");
        assert_eq!(entry.vote_total, 2);
        assert_eq!(entry.recent_votes, 1);
    }

    #[tokio::test]
    async fn cast_by_user_reports_only_own_votes() {
        let repo = InMemoryVoteRepository::new();
        let automation = Uuid::new_v4();
        let voter = UserId::random();
        let other = UserId::random();

        repo.toggle(automation, &voter, VoteValue::Down).await.expect("toggle");
        repo.toggle(automation, &other, VoteValue::Up).await.expect("toggle");

        let own = repo.cast_by_user(&voter, &[automation]).await.expect("cast");
        assert_eq!(own.get(&automation), Some(&VoteValue::Down));
    }
}
