//! Behavioural coverage for the recipe store service.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rstest::rstest;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::domain::ports::{
    ImageStore, ImageStoreError, MockImageStore, MockRecipeRepository, RecipePersistenceError,
    RecipeStore,
};
use crate::domain::{Error, ErrorCode, Recipe, RecipeDraft, RecipeRevision, UserId};

use super::RecipeService;

fn owner() -> UserId {
    UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("fixture id")
}

fn stranger() -> UserId {
    UserId::new("123e4567-e89b-12d3-a456-426614174000").expect("fixture id")
}

fn soup(id: Uuid) -> Recipe {
    Recipe::from_parts(
        id,
        "Soup".into(),
        "Hot soup".into(),
        "1 Main St".into(),
        "uploads/a.png".into(),
        owner(),
    )
}

fn service(
    repository: MockRecipeRepository,
    images: MockImageStore,
) -> RecipeService<MockRecipeRepository, MockImageStore> {
    RecipeService::new(Arc::new(repository), Arc::new(images))
}

/// Image store double that records removals and signals when one lands.
#[derive(Default)]
struct RecordingImageStore {
    removed: Mutex<Vec<String>>,
    fail: bool,
    notify: Notify,
}

impl RecordingImageStore {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    async fn wait_for_removal(&self) {
        tokio::time::timeout(Duration::from_secs(1), self.notify.notified())
            .await
            .expect("image removal should have been dispatched");
    }
}

#[async_trait]
impl ImageStore for RecordingImageStore {
    async fn remove(&self, path: &str) -> Result<(), ImageStoreError> {
        self.removed
            .lock()
            .expect("lock poisoned")
            .push(path.to_owned());
        self.notify.notify_one();
        if self.fail {
            return Err(ImageStoreError::io(path, "unlink failed"));
        }
        Ok(())
    }
}

fn assert_error(err: &Error, code: ErrorCode, message: &str) {
    assert_eq!(err.code(), code);
    assert_eq!(err.message(), message);
}

#[rstest]
#[tokio::test]
async fn get_recipe_maps_missing_row_to_not_found() {
    let mut repository = MockRecipeRepository::new();
    repository.expect_find_by_id().returning(|_| Ok(None));
    let service = service(repository, MockImageStore::new());

    let err = service
        .get_recipe(&Uuid::new_v4())
        .await
        .expect_err("missing recipe");
    assert_error(
        &err,
        ErrorCode::NotFound,
        "Could not find a recipe for the provided id.",
    );
}

#[rstest]
#[tokio::test]
async fn get_recipe_hides_storage_failures_behind_internal_error() {
    let mut repository = MockRecipeRepository::new();
    repository
        .expect_find_by_id()
        .returning(|_| Err(RecipePersistenceError::query("connection reset")));
    let service = service(repository, MockImageStore::new());

    let err = service
        .get_recipe(&Uuid::new_v4())
        .await
        .expect_err("storage failure");
    assert_error(
        &err,
        ErrorCode::InternalError,
        "Something went wrong, could not find a recipe.",
    );
}

#[rstest]
#[case(None)]
#[case(Some(vec![]))]
#[tokio::test]
async fn listing_conflates_missing_user_and_empty_list(#[case] stored: Option<Vec<Recipe>>) {
    let mut repository = MockRecipeRepository::new();
    repository
        .expect_find_by_creator()
        .returning(move |_| Ok(stored.clone()));
    let service = service(repository, MockImageStore::new());

    let err = service
        .get_recipes_for_user(&owner())
        .await
        .expect_err("neither case yields recipes");
    assert_error(
        &err,
        ErrorCode::NotFound,
        "Could not find recipes for the provided user id.",
    );
}

#[rstest]
#[tokio::test]
async fn listing_returns_the_stored_recipes() {
    let recipe = soup(Uuid::new_v4());
    let stored = vec![recipe.clone()];
    let mut repository = MockRecipeRepository::new();
    repository
        .expect_find_by_creator()
        .returning(move |_| Ok(Some(stored.clone())));
    let service = service(repository, MockImageStore::new());

    let recipes = service
        .get_recipes_for_user(&owner())
        .await
        .expect("recipes listed");
    assert_eq!(recipes, vec![recipe]);
}

#[rstest]
#[tokio::test]
async fn create_maps_missing_creator_to_not_found() {
    let mut repository = MockRecipeRepository::new();
    repository.expect_create().returning(|draft| {
        Err(RecipePersistenceError::CreatorNotFound {
            creator: *draft.creator().as_uuid(),
        })
    });
    let service = service(repository, MockImageStore::new());

    let draft = RecipeDraft::try_new("Soup", "Hot soup", "1 Main St", "uploads/a.png", owner())
        .expect("valid draft");
    let err = service.create_recipe(draft).await.expect_err("no creator");
    assert_error(
        &err,
        ErrorCode::NotFound,
        "Could not find user for provided id.",
    );
}

#[rstest]
#[tokio::test]
async fn create_maps_aborted_transaction_to_internal_error() {
    let mut repository = MockRecipeRepository::new();
    repository
        .expect_create()
        .returning(|_| Err(RecipePersistenceError::query("transaction aborted")));
    let service = service(repository, MockImageStore::new());

    let draft = RecipeDraft::try_new("Soup", "Hot soup", "1 Main St", "uploads/a.png", owner())
        .expect("valid draft");
    let err = service
        .create_recipe(draft)
        .await
        .expect_err("aborted transaction");
    assert_error(
        &err,
        ErrorCode::InternalError,
        "Creating recipe failed, please try again.",
    );
}

#[rstest]
#[tokio::test]
async fn update_by_non_owner_is_unauthorized_and_never_writes() {
    let id = Uuid::new_v4();
    let mut repository = MockRecipeRepository::new();
    repository
        .expect_find_by_id()
        .returning(move |_| Ok(Some(soup(id))));
    // No update_text expectation: the mock panics if the write is attempted.
    let service = service(repository, MockImageStore::new());

    let revision = RecipeRevision::try_new("New", "abcde").expect("valid revision");
    let err = service
        .update_recipe(&id, revision, &stranger())
        .await
        .expect_err("non-owner");
    assert_error(
        &err,
        ErrorCode::Unauthorized,
        "You are not allowed to edit this recipe.",
    );
}

#[rstest]
#[tokio::test]
async fn update_by_owner_returns_the_updated_recipe() {
    let id = Uuid::new_v4();
    let mut repository = MockRecipeRepository::new();
    repository
        .expect_find_by_id()
        .returning(move |_| Ok(Some(soup(id))));
    repository.expect_update_text().returning(move |_, revision| {
        Ok(Some(Recipe::from_parts(
            id,
            revision.title().to_owned(),
            revision.description().to_owned(),
            "1 Main St".into(),
            "uploads/a.png".into(),
            owner(),
        )))
    });
    let service = service(repository, MockImageStore::new());

    let revision = RecipeRevision::try_new("New", "abcde").expect("valid revision");
    let updated = service
        .update_recipe(&id, revision, &owner())
        .await
        .expect("owner may update");
    assert_eq!(updated.title(), "New");
    assert_eq!(updated.description(), "abcde");
}

#[rstest]
#[tokio::test]
async fn delete_by_non_owner_is_unauthorized_and_never_deletes() {
    let id = Uuid::new_v4();
    let mut repository = MockRecipeRepository::new();
    repository
        .expect_find_by_id()
        .returning(move |_| Ok(Some(soup(id))));
    // No delete expectation: the mock panics if the delete is attempted.
    let service = service(repository, MockImageStore::new());

    let err = service
        .delete_recipe(&id, &stranger())
        .await
        .expect_err("non-owner");
    assert_error(
        &err,
        ErrorCode::Unauthorized,
        "You are not allowed to delete this recipe.",
    );
}

#[rstest]
#[tokio::test]
async fn delete_dispatches_image_removal_after_commit() {
    let id = Uuid::new_v4();
    let mut repository = MockRecipeRepository::new();
    repository
        .expect_find_by_id()
        .returning(move |_| Ok(Some(soup(id))));
    repository.expect_delete().returning(|_| Ok(()));
    let images = Arc::new(RecordingImageStore::default());
    let service = RecipeService::new(Arc::new(repository), Arc::clone(&images));

    service
        .delete_recipe(&id, &owner())
        .await
        .expect("owner may delete");

    images.wait_for_removal().await;
    let removed = images.removed.lock().expect("lock poisoned").clone();
    assert_eq!(removed, vec!["uploads/a.png".to_owned()]);
}

#[rstest]
#[tokio::test]
async fn delete_succeeds_even_when_image_removal_fails() {
    let id = Uuid::new_v4();
    let mut repository = MockRecipeRepository::new();
    repository
        .expect_find_by_id()
        .returning(move |_| Ok(Some(soup(id))));
    repository.expect_delete().returning(|_| Ok(()));
    let images = Arc::new(RecordingImageStore::failing());
    let service = RecipeService::new(Arc::new(repository), Arc::clone(&images));

    service
        .delete_recipe(&id, &owner())
        .await
        .expect("filesystem failure must not surface");
    images.wait_for_removal().await;
}

#[rstest]
#[tokio::test]
async fn delete_racing_another_delete_maps_to_not_found() {
    let id = Uuid::new_v4();
    let mut repository = MockRecipeRepository::new();
    repository
        .expect_find_by_id()
        .returning(move |_| Ok(Some(soup(id))));
    repository
        .expect_delete()
        .returning(|id| Err(RecipePersistenceError::RecipeNotFound { id: *id }));
    let service = service(repository, MockImageStore::new());

    let err = service
        .delete_recipe(&id, &owner())
        .await
        .expect_err("row vanished");
    assert_error(&err, ErrorCode::NotFound, "Could not find recipe for this id.");
}
