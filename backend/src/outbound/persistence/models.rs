//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and
//! must never be exposed to the domain. Conversion into domain entities
//! happens in the repository adapters.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{automations, profiles, subscriptions, votes};

/// Row struct for reading from the profiles table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ProfileRow {
    pub id: Uuid,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for upserting profile rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = profiles)]
pub(crate) struct NewProfileRow<'a> {
    pub id: Uuid,
    pub name: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub email: &'a str,
}

/// Author columns selected alongside a listed automation.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AuthorRow {
    pub id: Uuid,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Row struct for reading from the automations table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = automations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct AutomationRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub prompt: String,
    pub tags: Vec<String>,
    pub slug: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating automation rows.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = automations)]
pub(crate) struct NewAutomationRow<'a> {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: &'a str,
    pub summary: &'a str,
    pub description: Option<&'a str>,
    pub prompt: &'a str,
    pub tags: &'a [String],
    pub slug: &'a str,
}

/// Changeset struct for updating automation rows.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = automations)]
pub(crate) struct AutomationUpdate<'a> {
    pub title: &'a str,
    pub summary: &'a str,
    pub description: Option<Option<&'a str>>,
    pub prompt: &'a str,
    pub tags: &'a [String],
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for casting votes.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = votes)]
pub(crate) struct NewVoteRow {
    pub automation_id: Uuid,
    pub user_id: Uuid,
    pub value: i16,
}

/// Row struct for reading from the subscriptions table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = subscriptions)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct SubscriptionRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable struct for creating subscription rows; the id comes from the
/// database default.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subscriptions)]
pub(crate) struct NewSubscriptionRow<'a> {
    pub user_id: Uuid,
    pub category: &'a str,
    pub active: bool,
}
