//! Recipe store service implementing the driving port.
//!
//! The service enforces ownership, maps persistence failures onto the
//! transport-agnostic [`Error`] payload, and dispatches the post-commit
//! image cleanup. Atomicity of the two-record writes lives behind the
//! [`RecipeRepository`] port; this layer never sees partial state.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::domain::ports::{
    ImageStore, RecipePersistenceError, RecipeRepository, RecipeStore,
};
use crate::domain::{Error, Recipe, RecipeDraft, RecipeRevision, UserId};

/// Recipe store implementing [`RecipeStore`] over the persistence and image
/// ports.
#[derive(Clone)]
pub struct RecipeService<R, I> {
    repository: Arc<R>,
    images: Arc<I>,
}

impl<R, I> RecipeService<R, I> {
    /// Create a new service with the given adapters.
    pub fn new(repository: Arc<R>, images: Arc<I>) -> Self {
        Self { repository, images }
    }
}

/// Log a persistence failure and collapse it to an internal error with a
/// caller-facing message.
fn internal(error: &RecipePersistenceError, message: &'static str) -> Error {
    debug!(%error, "recipe persistence operation failed");
    Error::internal(message)
}

impl<R, I> RecipeService<R, I>
where
    I: ImageStore + 'static,
{
    /// Remove a stored image after its recipe row is gone.
    ///
    /// Runs detached: the deletion already committed, so the response must
    /// not wait on the filesystem, and a failure only leaks a file.
    fn remove_image_detached(&self, path: String) {
        let images = Arc::clone(&self.images);
        tokio::spawn(async move {
            if let Err(error) = images.remove(&path).await {
                warn!(%error, path, "failed to remove recipe image after delete");
            }
        });
    }
}

#[async_trait]
impl<R, I> RecipeStore for RecipeService<R, I>
where
    R: RecipeRepository,
    I: ImageStore + 'static,
{
    async fn get_recipe(&self, id: &Uuid) -> Result<Recipe, Error> {
        self.repository
            .find_by_id(id)
            .await
            .map_err(|err| internal(&err, "Something went wrong, could not find a recipe."))?
            .ok_or_else(|| Error::not_found("Could not find a recipe for the provided id."))
    }

    async fn get_recipes_for_user(&self, user_id: &UserId) -> Result<Vec<Recipe>, Error> {
        let recipes = self
            .repository
            .find_by_creator(user_id)
            .await
            .map_err(|err| internal(&err, "Fetching recipes failed, please try again later."))?;
        // A missing user and an empty reference list produce the same
        // not-found signal; the API contract does not distinguish them.
        match recipes {
            Some(recipes) if !recipes.is_empty() => Ok(recipes),
            _ => Err(Error::not_found(
                "Could not find recipes for the provided user id.",
            )),
        }
    }

    async fn create_recipe(&self, draft: RecipeDraft) -> Result<Recipe, Error> {
        self.repository.create(&draft).await.map_err(|err| match err {
            RecipePersistenceError::CreatorNotFound { .. } => {
                Error::not_found("Could not find user for provided id.")
            }
            other => internal(&other, "Creating recipe failed, please try again."),
        })
    }

    async fn update_recipe(
        &self,
        id: &Uuid,
        revision: RecipeRevision,
        requester: &UserId,
    ) -> Result<Recipe, Error> {
        let recipe = self
            .repository
            .find_by_id(id)
            .await
            .map_err(|err| internal(&err, "Something went wrong, could not update recipe."))?
            .ok_or_else(|| Error::not_found("Could not find a recipe for the provided id."))?;

        if !recipe.is_owned_by(requester) {
            return Err(Error::unauthorized(
                "You are not allowed to edit this recipe.",
            ));
        }

        self.repository
            .update_text(id, &revision)
            .await
            .map_err(|err| internal(&err, "Something went wrong, could not update recipe."))?
            .ok_or_else(|| Error::not_found("Could not find a recipe for the provided id."))
    }

    async fn delete_recipe(&self, id: &Uuid, requester: &UserId) -> Result<(), Error> {
        let recipe = self
            .repository
            .find_by_id(id)
            .await
            .map_err(|err| internal(&err, "Something went wrong, could not delete recipe."))?
            .ok_or_else(|| Error::not_found("Could not find recipe for this id."))?;

        if !recipe.is_owned_by(requester) {
            return Err(Error::unauthorized(
                "You are not allowed to delete this recipe.",
            ));
        }

        self.repository.delete(id).await.map_err(|err| match err {
            RecipePersistenceError::RecipeNotFound { .. } => {
                Error::not_found("Could not find recipe for this id.")
            }
            other => internal(&other, "Something went wrong, could not delete recipe."),
        })?;

        self.remove_image_detached(recipe.image().to_owned());
        Ok(())
    }
}
