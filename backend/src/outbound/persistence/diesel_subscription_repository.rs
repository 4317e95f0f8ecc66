//! PostgreSQL-backed `SubscriptionRepository` implementation using Diesel.
//!
//! Enabling a subscription is a single conflict-aware insert keyed on
//! `(user_id, category)`, so two concurrent opt-ins can never create two
//! rows. Disabling is a conditional update that records nothing when no
//! row exists.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{
    SubscriberContact, SubscriptionRepository, SubscriptionRepositoryError,
};
use crate::domain::profile::{EmailAddress, UserId};
use crate::domain::subscription::{
    Subscription, SubscriptionCategory, SubscriptionId, SubscriptionPreferences,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewSubscriptionRow, SubscriptionRow};
use super::pool::{DbPool, PoolError};
use super::schema::{profiles, subscriptions};

/// Diesel-backed implementation of the `SubscriptionRepository` port.
#[derive(Clone)]
pub struct DieselSubscriptionRepository {
    pool: DbPool,
}

impl DieselSubscriptionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> SubscriptionRepositoryError {
    map_pool_error(error, SubscriptionRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> SubscriptionRepositoryError {
    map_diesel_error(
        error,
        SubscriptionRepositoryError::query,
        SubscriptionRepositoryError::connection,
    )
}

fn row_to_subscription(row: SubscriptionRow) -> Result<Subscription, SubscriptionRepositoryError> {
    let category: SubscriptionCategory = row.category.parse().map_err(|_| {
        SubscriptionRepositoryError::query("stored subscription category is unknown")
    })?;
    Ok(Subscription {
        id: SubscriptionId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        category,
        active: row.active,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl SubscriptionRepository for DieselSubscriptionRepository {
    async fn preferences_for(
        &self,
        user_id: &UserId,
    ) -> Result<SubscriptionPreferences, SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<(String, bool)> = subscriptions::table
            .filter(subscriptions::user_id.eq(user_id.as_uuid()))
            .select((subscriptions::category, subscriptions::active))
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;

        Ok(SubscriptionPreferences::from_pairs(rows.into_iter().filter_map(
            |(category, active)| match category.parse::<SubscriptionCategory>() {
                Ok(category) => Some((category, active)),
                Err(err) => {
                    warn!(error = %err, "ignoring subscription row with unknown category");
                    None
                }
            },
        )))
    }

    async fn set(
        &self,
        user_id: &UserId,
        category: SubscriptionCategory,
        active: bool,
    ) -> Result<(), SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        if active {
            diesel::insert_into(subscriptions::table)
                .values(&NewSubscriptionRow {
                    user_id: *user_id.as_uuid(),
                    category: category.as_str(),
                    active: true,
                })
                .on_conflict((subscriptions::user_id, subscriptions::category))
                .do_update()
                .set((
                    subscriptions::active.eq(true),
                    subscriptions::updated_at.eq(Utc::now()),
                ))
                .execute(&mut conn)
                .await
                .map(|_| ())
                .map_err(map_diesel)
        } else {
            // Never create a row just to record "off".
            diesel::update(
                subscriptions::table
                    .filter(subscriptions::user_id.eq(user_id.as_uuid()))
                    .filter(subscriptions::category.eq(category.as_str())),
            )
            .set((
                subscriptions::active.eq(false),
                subscriptions::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
        }
    }

    async fn find(
        &self,
        id: &SubscriptionId,
    ) -> Result<Option<Subscription>, SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row: Option<SubscriptionRow> = subscriptions::table
            .find(id.as_uuid())
            .select(SubscriptionRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        row.map(row_to_subscription).transpose()
    }

    async fn deactivate(&self, id: &SubscriptionId) -> Result<(), SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        diesel::update(subscriptions::table.find(id.as_uuid()))
            .set((
                subscriptions::active.eq(false),
                subscriptions::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }

    async fn active_recipients(
        &self,
        category: SubscriptionCategory,
        exclude: Option<UserId>,
    ) -> Result<Vec<SubscriberContact>, SubscriptionRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let mut query = subscriptions::table
            .inner_join(profiles::table)
            .filter(subscriptions::category.eq(category.as_str()))
            .filter(subscriptions::active.eq(true))
            .select((subscriptions::id, profiles::email))
            .into_boxed();
        if let Some(user) = exclude {
            query = query.filter(subscriptions::user_id.ne(*user.as_uuid()));
        }

        let rows: Vec<(Uuid, String)> = query.load(&mut conn).await.map_err(map_diesel)?;

        // Rows with unparseable emails are skipped, not fatal: one broken
        // profile must not silence the whole fan-out.
        Ok(rows
            .into_iter()
            .filter_map(|(id, email)| match EmailAddress::new(&email) {
                Ok(email) => Some(SubscriberContact {
                    subscription_id: SubscriptionId::from_uuid(id),
                    email,
                }),
                Err(err) => {
                    warn!(subscription_id = %id, error = %err, "skipping recipient with invalid email");
                    None
                }
            })
            .collect())
    }
}
