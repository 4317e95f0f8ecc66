//! PostgreSQL-backed `ProfileRepository` implementation using Diesel.
//!
//! Sign-ins upsert the profile row. Provider-supplied name and avatar only
//! fill gaps (`COALESCE(stored, excluded)`), so a name the user chose in
//! settings survives later sign-ins; the email always refreshes.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel::sql_types::{Nullable, Text};
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use tracing::warn;

use crate::domain::ports::{ProfileRepository, ProfileRepositoryError};
use crate::domain::profile::{
    DisplayName, EmailAddress, Profile, SessionIdentity, UserId,
};

use super::error_mapping::{map_diesel_error, map_pool_error};
use super::models::{NewProfileRow, ProfileRow};
use super::pool::{DbPool, PoolError};
use super::schema::profiles;

diesel::define_sql_function! {
    /// PostgreSQL COALESCE over two nullable text expressions.
    fn coalesce(a: Nullable<Text>, b: Nullable<Text>) -> Nullable<Text>;
}

/// Diesel-backed implementation of the `ProfileRepository` port.
#[derive(Clone)]
pub struct DieselProfileRepository {
    pool: DbPool,
}

impl DieselProfileRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> ProfileRepositoryError {
    map_pool_error(error, ProfileRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> ProfileRepositoryError {
    map_diesel_error(
        error,
        ProfileRepositoryError::query,
        ProfileRepositoryError::connection,
    )
}

fn row_to_profile(row: ProfileRow) -> Result<Profile, ProfileRepositoryError> {
    let email = EmailAddress::new(&row.email)
        .map_err(|_| ProfileRepositoryError::query("stored profile email is invalid"))?;
    // A stored name that no longer passes validation reads as unset rather
    // than poisoning the whole profile.
    let name = row.name.as_deref().and_then(|raw| match DisplayName::new(raw) {
        Ok(name) => Some(name),
        Err(err) => {
            warn!(user_id = %row.id, error = %err, "ignoring invalid stored display name");
            None
        }
    });
    Ok(Profile {
        id: UserId::from_uuid(row.id),
        name,
        avatar_url: row.avatar_url,
        email,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

#[async_trait]
impl ProfileRepository for DieselProfileRepository {
    async fn upsert_from_identity(
        &self,
        identity: &SessionIdentity,
    ) -> Result<Profile, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let new_row = NewProfileRow {
            id: *identity.user_id.as_uuid(),
            name: identity.name.as_ref().map(AsRef::as_ref),
            avatar_url: identity.avatar_url.as_deref(),
            email: identity.email.as_ref(),
        };

        let row: ProfileRow = diesel::insert_into(profiles::table)
            .values(&new_row)
            .on_conflict(profiles::id)
            .do_update()
            .set((
                profiles::email.eq(excluded(profiles::email)),
                profiles::name.eq(coalesce(profiles::name, excluded(profiles::name))),
                profiles::avatar_url.eq(coalesce(
                    profiles::avatar_url,
                    excluded(profiles::avatar_url),
                )),
                profiles::updated_at.eq(Utc::now()),
            ))
            .returning(ProfileRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel)?;

        row_to_profile(row)
    }

    async fn find(&self, user_id: &UserId) -> Result<Option<Profile>, ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row: Option<ProfileRow> = profiles::table
            .find(user_id.as_uuid())
            .select(ProfileRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        row.map(row_to_profile).transpose()
    }

    async fn update_name(
        &self,
        user_id: &UserId,
        name: Option<DisplayName>,
    ) -> Result<(), ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        diesel::update(profiles::table.find(user_id.as_uuid()))
            .set((
                profiles::name.eq(name.map(String::from)),
                profiles::updated_at.eq(Utc::now()),
            ))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), ProfileRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        diesel::delete(profiles::table.find(user_id.as_uuid()))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn profile_row(name: Option<&str>, email: &str) -> ProfileRow {
        ProfileRow {
            id: Uuid::new_v4(),
            name: name.map(str::to_owned),
            avatar_url: None,
            email: email.to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn valid_rows_convert() {
        let profile =
            row_to_profile(profile_row(Some("Casey"), "casey@example.com")).expect("valid row");
        assert_eq!(profile.name.as_ref().map(AsRef::as_ref), Some("Casey"));
        assert_eq!(profile.email.as_ref(), "casey@example.com");
    }

    #[test]
    fn invalid_stored_name_reads_as_unset() {
        let profile =
            row_to_profile(profile_row(Some("x"), "casey@example.com")).expect("valid row");
        assert!(profile.name.is_none());
    }

    #[test]
    fn invalid_stored_email_is_a_query_error() {
        assert!(matches!(
            row_to_profile(profile_row(None, "not-an-email")),
            Err(ProfileRepositoryError::Query { .. })
        ));
    }
}
