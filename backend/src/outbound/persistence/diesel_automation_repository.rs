//! PostgreSQL-backed `AutomationRepository` implementation using Diesel.
//!
//! Listing queries join the author profile in one round trip. The search
//! predicate mirrors `domain::automation::matches_search`: case-insensitive
//! substring over the text columns plus exact membership in the tag array.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::automation::{Automation, AutomationId};
use crate::domain::ports::{
    AuthorSummary, AutomationChanges, AutomationFilter, AutomationRepository,
    AutomationRepositoryError, AutomationWithAuthor, NewAutomationRecord,
};
use crate::domain::profile::UserId;

use super::error_mapping::{is_unique_violation, map_diesel_error, map_pool_error};
use super::models::{AuthorRow, AutomationRow, AutomationUpdate, NewAutomationRow};
use super::pool::{DbPool, PoolError};
use super::schema::{automations, profiles};

/// Diesel-backed implementation of the `AutomationRepository` port.
#[derive(Clone)]
pub struct DieselAutomationRepository {
    pool: DbPool,
}

impl DieselAutomationRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool(error: PoolError) -> AutomationRepositoryError {
    map_pool_error(error, AutomationRepositoryError::connection)
}

fn map_diesel(error: diesel::result::Error) -> AutomationRepositoryError {
    if is_unique_violation(&error) {
        return AutomationRepositoryError::conflict("duplicate slug");
    }
    map_diesel_error(
        error,
        AutomationRepositoryError::query,
        AutomationRepositoryError::connection,
    )
}

fn row_to_automation(row: AutomationRow) -> Automation {
    Automation {
        id: AutomationId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        title: row.title,
        summary: row.summary,
        description: row.description,
        prompt: row.prompt,
        tags: row.tags,
        slug: row.slug,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }
}

fn join_to_listing((row, author): (AutomationRow, Option<AuthorRow>)) -> AutomationWithAuthor {
    AutomationWithAuthor {
        automation: row_to_automation(row),
        author: author.map(|author| AuthorSummary {
            id: UserId::from_uuid(author.id),
            name: author.name,
            avatar_url: author.avatar_url,
        }),
    }
}

type JoinedRow = (AutomationRow, Option<AuthorRow>);

#[async_trait]
impl AutomationRepository for DieselAutomationRepository {
    async fn list(
        &self,
        filter: &AutomationFilter,
    ) -> Result<Vec<AutomationWithAuthor>, AutomationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let mut query = automations::table
            .left_join(profiles::table)
            .select((AutomationRow::as_select(), Option::<AuthorRow>::as_select()))
            .into_boxed();

        if let Some(term) = filter.search.as_deref() {
            // Nullable columns make the whole predicate Nullable<Bool>;
            // lift the non-null legs so the or-chain stays one type.
            let pattern = format!("%{term}%");
            query = query.filter(
                automations::title
                    .ilike(pattern.clone())
                    .nullable()
                    .or(automations::summary.ilike(pattern.clone()))
                    .or(automations::description.ilike(pattern.clone()))
                    .or(automations::prompt.ilike(pattern).nullable())
                    .or(automations::tags
                        .contains(vec![term.to_lowercase()])
                        .nullable()),
            );
        }

        query = query.order(automations::created_at.desc());
        if let Some(limit) = filter.limit {
            query = query.limit(limit);
        }

        let rows: Vec<JoinedRow> = query.load(&mut conn).await.map_err(map_diesel)?;
        Ok(rows.into_iter().map(join_to_listing).collect())
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
    ) -> Result<Vec<AutomationWithAuthor>, AutomationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let rows: Vec<JoinedRow> = automations::table
            .left_join(profiles::table)
            .filter(automations::user_id.eq(owner.as_uuid()))
            .order(automations::created_at.desc())
            .select((AutomationRow::as_select(), Option::<AuthorRow>::as_select()))
            .load(&mut conn)
            .await
            .map_err(map_diesel)?;
        Ok(rows.into_iter().map(join_to_listing).collect())
    }

    async fn find_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<AutomationWithAuthor>, AutomationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row: Option<JoinedRow> = automations::table
            .left_join(profiles::table)
            .filter(automations::slug.eq(slug))
            .select((AutomationRow::as_select(), Option::<AuthorRow>::as_select()))
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        Ok(row.map(join_to_listing))
    }

    async fn find_by_id(
        &self,
        id: &AutomationId,
    ) -> Result<Option<Automation>, AutomationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let row: Option<AutomationRow> = automations::table
            .find(id.as_uuid())
            .select(AutomationRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel)?;
        Ok(row.map(row_to_automation))
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, AutomationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        diesel::select(diesel::dsl::exists(
            automations::table.filter(automations::slug.eq(slug)),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel)
    }

    async fn insert(
        &self,
        record: &NewAutomationRecord,
    ) -> Result<Automation, AutomationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let new_row = NewAutomationRow {
            id: *record.id.as_uuid(),
            user_id: *record.user_id.as_uuid(),
            title: &record.title,
            summary: &record.summary,
            description: record.description.as_deref(),
            prompt: &record.prompt,
            tags: &record.tags,
            slug: &record.slug,
        };

        diesel::insert_into(automations::table)
            .values(&new_row)
            .returning(AutomationRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(row_to_automation)
            .map_err(map_diesel)
    }

    async fn update(
        &self,
        id: &AutomationId,
        changes: &AutomationChanges,
    ) -> Result<Automation, AutomationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        let update = AutomationUpdate {
            title: &changes.title,
            summary: &changes.summary,
            description: Some(changes.description.as_deref()),
            prompt: &changes.prompt,
            tags: &changes.tags,
            updated_at: chrono::Utc::now(),
        };

        diesel::update(automations::table.find(id.as_uuid()))
            .set(&update)
            .returning(AutomationRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(row_to_automation)
            .map_err(map_diesel)
    }

    async fn delete(&self, id: &AutomationId) -> Result<(), AutomationRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool)?;

        diesel::delete(automations::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn automation_row() -> AutomationRow {
        AutomationRow {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            title: "Smart Inbox Routing".to_owned(),
            summary: Some("Routes mail".to_owned()),
            description: None,
            prompt: "Route it".to_owned(),
            tags: vec!["email".to_owned()],
            slug: "smart-inbox-routing".to_owned(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn row_conversion_preserves_fields() {
        let row = automation_row();
        let id = row.id;
        let automation = row_to_automation(row);
        assert_eq!(automation.id.as_uuid(), &id);
        assert_eq!(automation.slug, "smart-inbox-routing");
        assert_eq!(automation.tags, vec!["email"]);
    }

    #[test]
    fn missing_author_joins_to_none() {
        let listing = join_to_listing((automation_row(), None));
        assert!(listing.author.is_none());
    }

    #[test]
    fn joined_author_carries_profile_fields() {
        let author = AuthorRow {
            id: Uuid::new_v4(),
            name: Some("Casey".to_owned()),
            avatar_url: None,
        };
        let listing = join_to_listing((automation_row(), Some(author)));
        let author = listing.author.expect("author present");
        assert_eq!(author.name.as_deref(), Some("Casey"));
    }

    #[test]
    fn unique_violations_map_to_conflict() {
        let error = diesel::result::Error::DatabaseError(
            diesel::result::DatabaseErrorKind::UniqueViolation,
            Box::new("duplicate key".to_owned()),
        );
        assert!(matches!(
            map_diesel(error),
            AutomationRepositoryError::Conflict { .. }
        ));
    }

    #[test]
    fn pool_errors_map_to_connection() {
        let mapped = map_pool(PoolError::checkout("connection refused"));
        assert!(matches!(
            mapped,
            AutomationRepositoryError::Connection { .. }
        ));
        assert!(mapped.to_string().contains("connection refused"));
    }
}
