//! PostgreSQL-backed `VoteRepository` implementation using Diesel.
//!
//! The toggle runs as one transaction: a conditional delete (the un-vote
//! case) followed by a conflict-aware upsert. The unique key on
//! `(automation_id, user_id)` guarantees at most one row per pair no
//! matter how mutations interleave. Aggregates are grouped sums over the
//! vote rows, windowed in SQL against the current time.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use diesel::dsl::sum;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{VoteRepository, VoteRepositoryError};
use crate::domain::profile::UserId;
use crate::domain::vote::{
    RECENT_WINDOW_DAYS, VoteStatistics, VoteTransition, VoteValue,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::NewVoteRow;
use super::pool::{DbPool, PoolError};
use super::schema::votes;

/// Diesel-backed implementation of the `VoteRepository` port.
#[derive(Clone)]
pub struct DieselVoteRepository {
    pool: DbPool,
}

impl DieselVoteRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> VoteRepositoryError {
    map_pool_error(error, VoteRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> VoteRepositoryError {
    map_diesel_error(
        error,
        VoteRepositoryError::query,
        VoteRepositoryError::connection,
    )
}

/// Fold `(id, sum)` rows into the statistics map, writing one field.
fn apply_sums(
    statistics: &mut HashMap<Uuid, VoteStatistics>,
    rows: Vec<(Uuid, Option<i64>)>,
    write: impl Fn(&mut VoteStatistics, i64),
) {
    for (id, total) in rows {
        let entry = statistics.entry(id).or_default();
        write(entry, total.unwrap_or(0));
    }
}

#[async_trait]
impl VoteRepository for DieselVoteRepository {
    async fn toggle(
        &self,
        automation_id: Uuid,
        user_id: &UserId,
        value: VoteValue,
    ) -> Result<VoteTransition, VoteRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;
        let user_uuid = *user_id.as_uuid();
        let stored_value = value.as_i16();

        conn.transaction::<VoteTransition, diesel::result::Error, _>(|conn| {
            async move {
                // Same value already stored: remove it (the un-vote case).
                let deleted = diesel::delete(
                    votes::table
                        .filter(votes::automation_id.eq(automation_id))
                        .filter(votes::user_id.eq(user_uuid))
                        .filter(votes::value.eq(stored_value)),
                )
                .execute(conn)
                .await?;
                if deleted > 0 {
                    return Ok(VoteTransition::Removed);
                }

                let existed: bool = diesel::select(diesel::dsl::exists(
                    votes::table
                        .filter(votes::automation_id.eq(automation_id))
                        .filter(votes::user_id.eq(user_uuid)),
                ))
                .get_result(conn)
                .await?;

                diesel::insert_into(votes::table)
                    .values(&NewVoteRow {
                        automation_id,
                        user_id: user_uuid,
                        value: stored_value,
                    })
                    .on_conflict((votes::automation_id, votes::user_id))
                    .do_update()
                    .set(votes::value.eq(stored_value))
                    .execute(conn)
                    .await?;

                Ok(if existed {
                    VoteTransition::Flipped
                } else {
                    VoteTransition::Inserted
                })
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel)
    }

    async fn statistics_for(
        &self,
        automation_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, VoteStatistics>, VoteRepositoryError> {
        if automation_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let totals: Vec<(Uuid, Option<i64>)> = votes::table
            .filter(votes::automation_id.eq_any(automation_ids))
            .group_by(votes::automation_id)
            .select((votes::automation_id, sum(votes::value)))
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        let cutoff = Utc::now() - Duration::days(RECENT_WINDOW_DAYS);
        let recent: Vec<(Uuid, Option<i64>)> = votes::table
            .filter(votes::automation_id.eq_any(automation_ids))
            .filter(votes::created_at.gt(cutoff))
            .group_by(votes::automation_id)
            .select((votes::automation_id, sum(votes::value)))
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        let mut statistics = HashMap::new();
        apply_sums(&mut statistics, totals, |entry, total| {
            entry.vote_total = total;
        });
        apply_sums(&mut statistics, recent, |entry, total| {
            entry.recent_votes = total;
        });
        Ok(statistics)
    }

    async fn cast_by_user(
        &self,
        user_id: &UserId,
        automation_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, VoteValue>, VoteRepositoryError> {
        if automation_ids.is_empty() {
            return Ok(HashMap::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<(Uuid, i16)> = votes::table
            .filter(votes::user_id.eq(user_id.as_uuid()))
            .filter(votes::automation_id.eq_any(automation_ids))
            .select((votes::automation_id, votes::value))
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        // The CHECK constraint keeps stored values in {-1, +1}; anything
        // else is skipped rather than failing the whole page.
        Ok(rows
            .into_iter()
            .filter_map(|(id, raw)| match VoteValue::try_from(raw) {
                Ok(value) => Some((id, value)),
                Err(err) => {
                    warn!(automation_id = %id, error = %err, "ignoring invalid stored vote");
                    None
                }
            })
            .collect())
    }
}
