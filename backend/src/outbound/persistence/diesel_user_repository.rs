//! PostgreSQL-backed [`UserRepository`] implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{DisplayName, User, UserId};

use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    let error_message = error.to_string();
    debug!(%error_message, "user diesel operation failed");
    UserPersistenceError::query(error_message)
}

/// Convert a database row into a validated domain user.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let display_name = DisplayName::new(row.display_name)
        .map_err(|err| UserPersistenceError::query(format!("stored display name invalid: {err}")))?;
    Ok(User::new(UserId::from_uuid(row.id), display_name))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn upsert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            id: *user.id().as_uuid(),
            display_name: user.display_name().as_ref(),
            recipe_ids: Vec::new(),
        };
        // On conflict only the display name changes: an existing reference
        // list must survive re-registration.
        diesel::insert_into(users::table)
            .values(&row)
            .on_conflict(users::id)
            .do_update()
            .set(users::display_name.eq(excluded(users::display_name)))
            .execute(&mut conn)
            .await
            .map(drop)
            .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_user).transpose()
    }
}
