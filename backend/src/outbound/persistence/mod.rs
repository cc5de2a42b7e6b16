//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! This module provides concrete implementations of domain repository ports
//! backed by PostgreSQL via the Diesel ORM with async support through
//! `diesel-async` and `bb8` connection pooling.
//!
//! # Architecture
//!
//! - **Thin adapters**: repository implementations only translate between
//!   Diesel models and domain types, plus the transaction boundaries the
//!   ports promise. No other business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are implementation details, never exposed to
//!   the domain layer.
//! - **Strongly typed errors**: all database errors are mapped to domain
//!   persistence error types; nothing Diesel-shaped crosses the boundary.

mod diesel_login_service;
mod diesel_recipe_repository;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_login_service::DieselLoginService;
pub use diesel_recipe_repository::DieselRecipeRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};

use diesel::Connection;
use diesel::pg::PgConnection;
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};

/// Schema migrations compiled into the binary.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

/// Errors raised while applying schema migrations at startup.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Could not open the administrative connection.
    #[error("failed to connect for migrations: {0}")]
    Connection(String),
    /// A migration failed to apply.
    #[error("failed to run migrations: {0}")]
    Migration(String),
}

/// Apply any pending migrations over a blocking connection.
///
/// Diesel's migration harness is synchronous; call this through
/// `spawn_blocking` (or before the async runtime spins up request handling).
pub fn run_pending_migrations(database_url: &str) -> Result<(), MigrationError> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|err| MigrationError::Connection(err.to_string()))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map(drop)
        .map_err(|err| MigrationError::Migration(err.to_string()))
}
