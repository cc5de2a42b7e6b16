//! Deterministic test doubles shared by unit and integration tests.
//!
//! The in-memory repository honours the same contract as the PostgreSQL
//! adapter: the recipe write and the creator's reference-list write land
//! together or not at all, and fault injection can abort the reference
//! write to exercise the rollback path without a database.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_http::Request;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use async_trait::async_trait;
use tokio::sync::Notify;
use uuid::Uuid;

use crate::domain::ports::{
    ImageStore, ImageStoreError, LoginService, RecipePersistenceError, RecipeRepository,
};
use crate::domain::{
    Error, LoginCredentials, Recipe, RecipeDraft, RecipeRevision, RecipeService, UserId,
};
use crate::inbound::http::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Login double accepting any UUID username with the fixture password.
///
/// Lets tests authenticate as several distinct identities, which the
/// single-identity fixture service cannot express.
#[derive(Debug, Default, Clone, Copy)]
pub struct TestLoginService;

#[async_trait]
impl LoginService for TestLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        if credentials.password() != "password" {
            return Err(Error::unauthorized("invalid credentials"));
        }
        UserId::new(credentials.username())
            .map_err(|_| Error::unauthorized("invalid credentials"))
    }
}

#[derive(Default)]
struct UserRecord {
    recipe_ids: Vec<Uuid>,
}

#[derive(Default)]
struct StoreState {
    recipes: HashMap<Uuid, Recipe>,
    users: HashMap<Uuid, UserRecord>,
}

/// In-memory [`RecipeRepository`] with the adapter's atomicity contract.
#[derive(Default)]
pub struct InMemoryRecipeRepository {
    state: Mutex<StoreState>,
    fail_reference_writes: AtomicBool,
}

impl InMemoryRecipeRepository {
    /// Register a user record with an empty reference list.
    pub fn insert_user(&self, id: &UserId) {
        self.state
            .lock()
            .expect("store lock poisoned")
            .users
            .insert(*id.as_uuid(), UserRecord::default());
    }

    /// Store a recipe and its back-reference directly, bypassing the port.
    pub fn seed_recipe(
        &self,
        owner: &UserId,
        title: &str,
        description: &str,
        image: &str,
    ) -> Recipe {
        let recipe = Recipe::from_parts(
            Uuid::new_v4(),
            title.to_owned(),
            description.to_owned(),
            "1 Main St".to_owned(),
            image.to_owned(),
            *owner,
        );
        let mut state = self.state.lock().expect("store lock poisoned");
        state
            .users
            .entry(*owner.as_uuid())
            .or_default()
            .recipe_ids
            .push(*recipe.id());
        state.recipes.insert(*recipe.id(), recipe.clone());
        recipe
    }

    /// Current stored copy of a recipe, if any.
    pub fn stored_recipe(&self, id: &Uuid) -> Option<Recipe> {
        self.state
            .lock()
            .expect("store lock poisoned")
            .recipes
            .get(id)
            .cloned()
    }

    /// Current reference list for a user, if the user exists.
    pub fn user_recipe_ids(&self, user: &UserId) -> Option<Vec<Uuid>> {
        self.state
            .lock()
            .expect("store lock poisoned")
            .users
            .get(user.as_uuid())
            .map(|record| record.recipe_ids.clone())
    }

    /// Force subsequent reference-list writes to fail, aborting their
    /// transaction.
    pub fn fail_reference_writes(&self, fail: bool) {
        self.fail_reference_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl RecipeRepository for InMemoryRecipeRepository {
    async fn find_by_id(&self, id: &Uuid) -> Result<Option<Recipe>, RecipePersistenceError> {
        Ok(self.stored_recipe(id))
    }

    async fn find_by_creator(
        &self,
        creator: &UserId,
    ) -> Result<Option<Vec<Recipe>>, RecipePersistenceError> {
        let state = self.state.lock().expect("store lock poisoned");
        let Some(record) = state.users.get(creator.as_uuid()) else {
            return Ok(None);
        };
        let recipes = record
            .recipe_ids
            .iter()
            .filter_map(|id| state.recipes.get(id).cloned())
            .collect();
        Ok(Some(recipes))
    }

    async fn create(&self, draft: &RecipeDraft) -> Result<Recipe, RecipePersistenceError> {
        let mut state = self.state.lock().expect("store lock poisoned");
        if !state.users.contains_key(draft.creator().as_uuid()) {
            return Err(RecipePersistenceError::CreatorNotFound {
                creator: *draft.creator().as_uuid(),
            });
        }
        // The reference write failed, so the whole transaction rolls back:
        // neither the recipe row nor the reference list may change.
        if self.fail_reference_writes.load(Ordering::SeqCst) {
            return Err(RecipePersistenceError::query(
                "creator reference write failed; transaction rolled back",
            ));
        }
        let recipe = Recipe::from_parts(
            Uuid::new_v4(),
            draft.title().to_owned(),
            draft.description().to_owned(),
            draft.address().to_owned(),
            draft.image().to_owned(),
            *draft.creator(),
        );
        state.recipes.insert(*recipe.id(), recipe.clone());
        if let Some(record) = state.users.get_mut(draft.creator().as_uuid()) {
            record.recipe_ids.push(*recipe.id());
        }
        Ok(recipe)
    }

    async fn update_text(
        &self,
        id: &Uuid,
        revision: &RecipeRevision,
    ) -> Result<Option<Recipe>, RecipePersistenceError> {
        let mut state = self.state.lock().expect("store lock poisoned");
        let Some(existing) = state.recipes.get(id) else {
            return Ok(None);
        };
        let updated = Recipe::from_parts(
            *existing.id(),
            revision.title().to_owned(),
            revision.description().to_owned(),
            existing.address().to_owned(),
            existing.image().to_owned(),
            *existing.creator(),
        );
        state.recipes.insert(*id, updated.clone());
        Ok(Some(updated))
    }

    async fn delete(&self, id: &Uuid) -> Result<(), RecipePersistenceError> {
        let mut state = self.state.lock().expect("store lock poisoned");
        let Some(recipe) = state.recipes.remove(id) else {
            return Err(RecipePersistenceError::RecipeNotFound { id: *id });
        };
        if let Some(record) = state.users.get_mut(recipe.creator().as_uuid()) {
            record.recipe_ids.retain(|stored| stored != id);
        }
        Ok(())
    }
}

/// Recording [`ImageStore`] that never touches the filesystem.
#[derive(Default)]
pub struct InMemoryImageStore {
    removed: Mutex<Vec<String>>,
    fail: AtomicBool,
    notify: Notify,
}

impl InMemoryImageStore {
    /// Paths removal was requested for, in order.
    pub fn removed(&self) -> Vec<String> {
        self.removed.lock().expect("image lock poisoned").clone()
    }

    /// Make subsequent removals fail after recording.
    pub fn fail_removals(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Wait until at least one removal has been dispatched.
    ///
    /// # Panics
    /// Panics if no removal lands within one second.
    pub async fn wait_for_removal(&self) {
        tokio::time::timeout(Duration::from_secs(1), self.notify.notified())
            .await
            .expect("image removal should have been dispatched");
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn remove(&self, path: &str) -> Result<(), ImageStoreError> {
        self.removed
            .lock()
            .expect("image lock poisoned")
            .push(path.to_owned());
        self.notify.notify_one();
        if self.fail.load(Ordering::SeqCst) {
            return Err(ImageStoreError::io(path, "unlink failed"));
        }
        Ok(())
    }
}

/// Wire an [`HttpState`] over in-memory adapters with the given users
/// registered.
pub fn seeded_state(
    users: &[UserId],
) -> (HttpState, Arc<InMemoryRecipeRepository>, Arc<InMemoryImageStore>) {
    let repository = Arc::new(InMemoryRecipeRepository::default());
    for user in users {
        repository.insert_user(user);
    }
    let images = Arc::new(InMemoryImageStore::default());
    let service = RecipeService::new(Arc::clone(&repository), Arc::clone(&images));
    let state = HttpState::new(
        Arc::new(TestLoginService),
        Arc::new(service),
        images.clone(),
    );
    (state, repository, images)
}

/// Log in as `user` against an app exposing `POST /api/v1/login` wired with
/// [`TestLoginService`], returning the session cookie.
///
/// # Panics
/// Panics when login fails or no session cookie is issued.
pub async fn session_cookie_for<S, B>(app: &S, user: &UserId) -> Cookie<'static>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let response = actix_web::test::call_service(
        app,
        actix_web::test::TestRequest::post()
            .uri("/api/v1/login")
            .set_json(serde_json::json!({
                "username": user.to_string(),
                "password": "password",
            }))
            .to_request(),
    )
    .await;
    assert!(
        response.status().is_success(),
        "login failed with {}",
        response.status()
    );
    response
        .response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .map(Cookie::into_owned)
        .expect("session cookie issued")
}
