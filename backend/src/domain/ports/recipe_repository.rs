//! Port abstraction for recipe persistence adapters and their errors.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Recipe, RecipeDraft, RecipeRevision, UserId};

/// Persistence errors raised by recipe repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipePersistenceError {
    /// Repository connection could not be established.
    #[error("recipe repository connection failed: {message}")]
    Connection {
        /// Adapter-level failure description.
        message: String,
    },
    /// Query or mutation failed during execution; any open transaction was
    /// rolled back.
    #[error("recipe repository query failed: {message}")]
    Query {
        /// Adapter-level failure description.
        message: String,
    },
    /// The recipe row does not exist.
    #[error("recipe {id} does not exist")]
    RecipeNotFound {
        /// Identifier that failed to resolve.
        id: Uuid,
    },
    /// The creator referenced by a draft does not exist.
    #[error("creator {creator} does not exist")]
    CreatorNotFound {
        /// Identifier that failed to resolve.
        creator: Uuid,
    },
}

impl RecipePersistenceError {
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

/// Driven port for recipe storage.
///
/// Implementations own the atomicity contract: [`create`] and [`delete`]
/// must apply the recipe write and the creator's reference-list write as a
/// single all-or-nothing unit, and must never leave one side applied when
/// the other failed.
///
/// [`create`]: RecipeRepository::create
/// [`delete`]: RecipeRepository::delete
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Fetch a recipe by identifier.
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Recipe>, RecipePersistenceError>;

    /// Fetch the recipes referenced by a user's stored reference list.
    ///
    /// Returns `None` when the user record itself does not exist, and an
    /// empty vector when the user exists but owns nothing; callers decide
    /// whether to distinguish the two.
    async fn find_by_creator(
        &self,
        creator: &UserId,
    ) -> Result<Option<Vec<Recipe>>, RecipePersistenceError>;

    /// Insert a recipe and append its id to the creator's reference list in
    /// one transaction.
    ///
    /// Fails with [`RecipePersistenceError::CreatorNotFound`] when the
    /// creator record is absent; the check happens inside the transaction so
    /// no partial state can be observed.
    async fn create(&self, draft: &RecipeDraft) -> Result<Recipe, RecipePersistenceError>;

    /// Overwrite a recipe's title and description.
    ///
    /// Returns `None` when the recipe no longer exists.
    async fn update_text(
        &self,
        id: &Uuid,
        revision: &RecipeRevision,
    ) -> Result<Option<Recipe>, RecipePersistenceError>;

    /// Delete a recipe and remove its id from the creator's reference list
    /// in one transaction.
    ///
    /// Fails with [`RecipePersistenceError::RecipeNotFound`] when the row
    /// vanished before the transaction took its lock.
    async fn delete(&self, id: &Uuid) -> Result<(), RecipePersistenceError>;
}
