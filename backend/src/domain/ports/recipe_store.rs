//! Driving port for the recipe store use-cases.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! run recipe operations without knowing (or importing) the backing
//! infrastructure. This keeps HTTP handler tests deterministic because they
//! can substitute a test double instead of wiring persistence.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Error, Recipe, RecipeDraft, RecipeRevision, UserId};

/// Domain use-case port for recipe CRUD and the two-record consistency
/// protocol binding a recipe to its creator's reference list.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Fetch a single recipe by id.
    async fn get_recipe(&self, id: &Uuid) -> Result<Recipe, Error>;

    /// Fetch every recipe authored by `user_id`.
    ///
    /// A missing user and a user with zero recipes both surface as the same
    /// not-found error; callers cannot tell the cases apart.
    async fn get_recipes_for_user(&self, user_id: &UserId) -> Result<Vec<Recipe>, Error>;

    /// Create a recipe and append it to the creator's reference list, both
    /// in one atomic unit.
    async fn create_recipe(&self, draft: RecipeDraft) -> Result<Recipe, Error>;

    /// Replace a recipe's title and description. Only the creator may do so.
    async fn update_recipe(
        &self,
        id: &Uuid,
        revision: RecipeRevision,
        requester: &UserId,
    ) -> Result<Recipe, Error>;

    /// Delete a recipe and remove it from the creator's reference list, both
    /// in one atomic unit. Only the creator may do so. The stored image file
    /// is removed best-effort after the deletion commits.
    async fn delete_recipe(&self, id: &Uuid, requester: &UserId) -> Result<(), Error>;
}
