//! Port abstraction for user persistence adapters and their errors.

use async_trait::async_trait;

use crate::domain::{User, UserId};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserPersistenceError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection {
        /// Adapter-level failure description.
        message: String,
    },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query {
        /// Adapter-level failure description.
        message: String,
    },
}

impl UserPersistenceError {
    /// Connection-failure constructor.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Query-failure constructor.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }
}

/// Driven port for user storage.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert or update a user record, preserving any stored recipe
    /// reference list.
    async fn upsert(&self, user: &User) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;
}
