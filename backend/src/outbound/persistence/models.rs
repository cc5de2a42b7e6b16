//! Diesel row structs bridging the schema and the domain types.
//!
//! Rows stay private to the persistence layer; repositories convert them to
//! and from validated domain types at the boundary.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{recipes, users};

/// A stored recipe row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = recipes, check_for_backend(diesel::pg::Pg))]
pub struct RecipeRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub address: String,
    pub image: String,
    pub creator_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable recipe row; timestamps come from column defaults.
#[derive(Debug, Insertable)]
#[diesel(table_name = recipes)]
pub struct NewRecipeRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub description: &'a str,
    pub address: &'a str,
    pub image: &'a str,
    pub creator_id: Uuid,
}

/// Changeset overwriting a recipe's mutable text fields.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = recipes)]
pub struct RecipeTextUpdate<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub updated_at: DateTime<Utc>,
}

/// A stored user row, including the authored-recipe reference list.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users, check_for_backend(diesel::pg::Pg))]
pub struct UserRow {
    pub id: Uuid,
    pub display_name: String,
    pub recipe_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insertable user row starting with an empty reference list.
#[derive(Debug, Insertable)]
#[diesel(table_name = users)]
pub struct NewUserRow<'a> {
    pub id: Uuid,
    pub display_name: &'a str,
    pub recipe_ids: Vec<Uuid>,
}
