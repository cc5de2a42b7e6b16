//! PostgreSQL-backed [`RecipeRepository`] implementation using Diesel ORM.
//!
//! This adapter owns the two-row consistency protocol: creating a recipe
//! inserts the recipe row and appends its id to the creator's reference
//! list inside one transaction, and deleting reverses both writes the same
//! way. The creator row is locked `FOR UPDATE` so concurrent mutations of
//! one user's list serialise instead of losing updates; PostgreSQL's
//! atomicity guarantees that an abort leaves neither side applied.

use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt as _;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{RecipePersistenceError, RecipeRepository};
use crate::domain::{Recipe, RecipeDraft, RecipeRevision, UserId};

use super::models::{NewRecipeRow, RecipeRow, RecipeTextUpdate, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::{recipes, users};

/// Diesel-backed implementation of the [`RecipeRepository`] port.
#[derive(Clone)]
pub struct DieselRecipeRepository {
    pool: DbPool,
}

impl DieselRecipeRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Map pool errors to domain repository errors.
fn map_pool_error(error: PoolError) -> RecipePersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            RecipePersistenceError::connection(message)
        }
    }
}

/// Map Diesel errors to domain repository errors.
fn map_diesel_error(error: diesel::result::Error) -> RecipePersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "recipe diesel operation failed");
        }
        other => debug!(error = %other, "recipe diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            RecipePersistenceError::connection("database connection error")
        }
        _ => RecipePersistenceError::query("database error"),
    }
}

/// Failures raised inside the create/delete transactions.
///
/// Everything in this enum aborts the surrounding transaction; the `From`
/// impl lets `?` promote plain Diesel errors inside the closure.
#[derive(Debug)]
enum TxError {
    Diesel(diesel::result::Error),
    CreatorMissing(Uuid),
    RecipeMissing(Uuid),
}

impl From<diesel::result::Error> for TxError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Diesel(error)
    }
}

fn map_tx_error(error: TxError) -> RecipePersistenceError {
    match error {
        TxError::Diesel(err) => map_diesel_error(err),
        TxError::CreatorMissing(creator) => RecipePersistenceError::CreatorNotFound { creator },
        TxError::RecipeMissing(id) => RecipePersistenceError::RecipeNotFound { id },
    }
}

/// Convert a database row to a domain recipe.
fn row_to_recipe(row: RecipeRow) -> Recipe {
    Recipe::from_parts(
        row.id,
        row.title,
        row.description,
        row.address,
        row.image,
        UserId::from_uuid(row.creator_id),
    )
}

#[async_trait]
impl RecipeRepository for DieselRecipeRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Recipe>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<RecipeRow> = recipes::table
            .find(id)
            .select(RecipeRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(row_to_recipe))
    }

    async fn find_by_creator(
        &self,
        creator: &UserId,
    ) -> Result<Option<Vec<Recipe>>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let creator_id = *creator.as_uuid();

        // Read the user row and the referenced recipes in one transaction so
        // both observe the same MVCC snapshot: a half-applied create/delete
        // can never show up as a dangling reference here.
        let rows: Option<Vec<RecipeRow>> = conn
            .transaction(|conn| {
                async move {
                    let user: Option<UserRow> = users::table
                        .find(creator_id)
                        .select(UserRow::as_select())
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(user) = user else {
                        return Ok(None);
                    };
                    let rows: Vec<RecipeRow> = recipes::table
                        .filter(recipes::id.eq_any(user.recipe_ids))
                        .order_by(recipes::created_at.asc())
                        .select(RecipeRow::as_select())
                        .load(conn)
                        .await?;
                    Ok(Some(rows))
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.map(|rows| rows.into_iter().map(row_to_recipe).collect()))
    }

    async fn create(&self, draft: &RecipeDraft) -> Result<Recipe, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let creator_id = *draft.creator().as_uuid();
        let row = NewRecipeRow {
            id: Uuid::new_v4(),
            title: draft.title(),
            description: draft.description(),
            address: draft.address(),
            image: draft.image(),
            creator_id,
        };

        let created: RecipeRow = conn
            .transaction(|conn| {
                async move {
                    // Lock the creator row: concurrent creates/deletes for
                    // the same user serialise on this lock, and a missing
                    // row aborts before anything is written.
                    let user: Option<UserRow> = users::table
                        .find(creator_id)
                        .select(UserRow::as_select())
                        .for_update()
                        .first(conn)
                        .await
                        .optional()?;
                    let Some(user) = user else {
                        return Err(TxError::CreatorMissing(creator_id));
                    };

                    let created: RecipeRow = diesel::insert_into(recipes::table)
                        .values(&row)
                        .returning(RecipeRow::as_returning())
                        .get_result(conn)
                        .await?;

                    let mut recipe_ids = user.recipe_ids;
                    recipe_ids.push(created.id);
                    diesel::update(users::table.find(creator_id))
                        .set((
                            users::recipe_ids.eq(recipe_ids),
                            users::updated_at.eq(Utc::now()),
                        ))
                        .execute(conn)
                        .await?;

                    Ok(created)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_tx_error)?;

        Ok(row_to_recipe(created))
    }

    async fn update_text(
        &self,
        id: &Uuid,
        revision: &RecipeRevision,
    ) -> Result<Option<Recipe>, RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated: Option<RecipeRow> = diesel::update(recipes::table.find(id))
            .set(&RecipeTextUpdate {
                title: revision.title(),
                description: revision.description(),
                updated_at: Utc::now(),
            })
            .returning(RecipeRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(updated.map(row_to_recipe))
    }

    async fn delete(&self, id: &Uuid) -> Result<(), RecipePersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let recipe_id = *id;

        conn.transaction(|conn| {
            async move {
                let recipe: Option<RecipeRow> = recipes::table
                    .find(recipe_id)
                    .select(RecipeRow::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                let Some(recipe) = recipe else {
                    return Err(TxError::RecipeMissing(recipe_id));
                };

                // Lock the creator before touching its reference list. A
                // recipe whose creator row has vanished is corrupted state:
                // abort rather than half-delete.
                let user: Option<UserRow> = users::table
                    .find(recipe.creator_id)
                    .select(UserRow::as_select())
                    .for_update()
                    .first(conn)
                    .await
                    .optional()?;
                let Some(user) = user else {
                    return Err(TxError::CreatorMissing(recipe.creator_id));
                };

                diesel::delete(recipes::table.find(recipe_id))
                    .execute(conn)
                    .await?;

                let recipe_ids: Vec<Uuid> = user
                    .recipe_ids
                    .into_iter()
                    .filter(|stored| *stored != recipe_id)
                    .collect();
                diesel::update(users::table.find(recipe.creator_id))
                    .set((
                        users::recipe_ids.eq(recipe_ids),
                        users::updated_at.eq(Utc::now()),
                    ))
                    .execute(conn)
                    .await?;

                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_tx_error)
    }
}

#[cfg(test)]
mod tests {
    //! Error-mapping coverage; behaviour against a live database is covered
    //! by the in-memory contract double in the integration suite.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn tx_errors_map_to_typed_port_errors() {
        let creator = Uuid::new_v4();
        assert_eq!(
            map_tx_error(TxError::CreatorMissing(creator)),
            RecipePersistenceError::CreatorNotFound { creator }
        );
        let id = Uuid::new_v4();
        assert_eq!(
            map_tx_error(TxError::RecipeMissing(id)),
            RecipePersistenceError::RecipeNotFound { id }
        );
    }

    #[rstest]
    fn diesel_not_found_maps_to_query_error() {
        let mapped = map_tx_error(TxError::Diesel(diesel::result::Error::NotFound));
        assert_eq!(mapped, RecipePersistenceError::query("database error"));
    }

    #[rstest]
    fn pool_errors_map_to_connection_errors() {
        let mapped = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(mapped, RecipePersistenceError::connection("timed out"));
    }
}
