//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation. Regenerate with `diesel print-schema` after migrations
//! change.

diesel::table! {
    /// Profile rows, one per authenticated user.
    profiles (id) {
        /// Primary key: the authentication provider's stable user id.
        id -> Uuid,
        /// Optional display name.
        name -> Nullable<Text>,
        /// Optional avatar reference.
        avatar_url -> Nullable<Text>,
        /// Dispatch-only email address.
        email -> Text,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Community-submitted automation recipes.
    automations (id) {
        /// Primary key: UUID v4 generated by the application.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// Display title.
        title -> Text,
        /// One-line summary.
        summary -> Nullable<Text>,
        /// Long-form markdown description.
        description -> Nullable<Text>,
        /// Prompt payload users copy.
        prompt -> Text,
        /// Normalised lowercase tags.
        tags -> Array<Text>,
        /// Unique URL-safe slug.
        slug -> Text,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Vote rows, at most one per (automation, user) pair.
    votes (automation_id, user_id) {
        /// Automation the vote applies to.
        automation_id -> Uuid,
        /// User who cast the vote.
        user_id -> Uuid,
        /// Signed magnitude, -1 or +1.
        value -> Int2,
        /// When the vote was first cast.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Notification subscriptions, at most one per (user, category) pair.
    subscriptions (id) {
        /// Primary key: generated by the database; referenced by
        /// unsubscribe links.
        id -> Uuid,
        /// Owning user.
        user_id -> Uuid,
        /// Category: "new" or "trending".
        category -> Text,
        /// Whether the subscription is active.
        active -> Bool,
        /// Row creation timestamp.
        created_at -> Timestamptz,
        /// Last flip timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(automations -> profiles (user_id));
diesel::joinable!(votes -> automations (automation_id));
diesel::joinable!(subscriptions -> profiles (user_id));

diesel::allow_tables_to_appear_in_same_query!(profiles, automations, votes, subscriptions);
