//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation.
//!
//! The `users.recipe_ids` column is a denormalized reference list, the
//! document-model back-reference this service keeps consistent with
//! `recipes.creator_id` through explicit transactions. It is deliberately
//! not a foreign-key join.

diesel::table! {
    /// User accounts table.
    ///
    /// Stores registered users with their display names, authored-recipe
    /// reference lists, and audit timestamps.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Human-readable display name.
        display_name -> Varchar,
        /// Identifiers of every recipe this user authored.
        recipe_ids -> Array<Uuid>,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Recipes table.
    recipes (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Recipe title.
        title -> Varchar,
        /// Recipe description.
        description -> Text,
        /// Free-form address associated with the recipe.
        address -> Varchar,
        /// Filesystem path of the uploaded image.
        image -> Varchar,
        /// Identifier of the owning user.
        creator_id -> Uuid,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::allow_tables_to_appear_in_same_query!(recipes, users);
