//! Recipe API handlers.
//!
//! ```text
//! GET    /api/v1/recipes/{id}
//! GET    /api/v1/recipes/user/{user_id}
//! POST   /api/v1/recipes            (multipart: title, description, address, image)
//! PATCH  /api/v1/recipes/{id}       {"title":"New","description":"abcde"}
//! DELETE /api/v1/recipes/{id}
//! ```
//!
//! Reads are public; mutations require a session and the store enforces
//! that only the creator may update or delete.

use std::path::Path;
use std::sync::Arc;

use actix_multipart::form::MultipartForm;
use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::ports::ImageStore;
use crate::domain::{Error, Recipe, RecipeDraft, RecipeRevision, RecipeValidationError, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::upload::{self, CreateRecipeForm, UploadConfig};

/// Envelope for single-recipe responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecipeResponse {
    /// The recipe payload.
    pub recipe: Recipe,
}

/// Envelope for recipe-list responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecipesResponse {
    /// The recipes authored by the requested user.
    pub recipes: Vec<Recipe>,
}

/// Envelope for plain confirmation messages.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    /// Human-readable confirmation.
    pub message: String,
}

/// JSON body for `PATCH /api/v1/recipes/{id}`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateRecipeRequest {
    /// Replacement title.
    pub title: String,
    /// Replacement description.
    pub description: String,
}

fn map_validation_error(err: RecipeValidationError) -> Error {
    match err {
        RecipeValidationError::EmptyTitle => Error::invalid_request("title must not be empty")
            .with_details(json!({ "field": "title", "code": "empty_title" })),
        RecipeValidationError::DescriptionTooShort { min } => {
            Error::invalid_request(format!("description must be at least {min} characters"))
                .with_details(json!({ "field": "description", "code": "description_too_short" }))
        }
        RecipeValidationError::EmptyAddress => Error::invalid_request("address must not be empty")
            .with_details(json!({ "field": "address", "code": "empty_address" })),
        RecipeValidationError::EmptyImage => Error::invalid_request("image must be provided")
            .with_details(json!({ "field": "image", "code": "missing_image" })),
    }
}

/// Discard a stored upload whose recipe never materialised.
fn discard_stored_image(images: &Arc<dyn ImageStore>, path: &Path) {
    let images = Arc::clone(images);
    let path = path.to_string_lossy().into_owned();
    tokio::spawn(async move {
        if let Err(error) = images.remove(&path).await {
            warn!(%error, path, "failed to discard image for unsaved recipe");
        }
    });
}

/// Fetch a single recipe.
#[utoipa::path(
    get,
    path = "/api/v1/recipes/{id}",
    params(("id" = Uuid, Path, description = "Recipe identifier")),
    responses(
        (status = 200, description = "Recipe found", body = RecipeResponse),
        (status = 404, description = "No recipe with this id", body = crate::domain::Error),
        (status = 500, description = "Internal server error", body = crate::domain::Error)
    ),
    tags = ["recipes"],
    operation_id = "getRecipe",
    security([])
)]
#[get("/recipes/{id}")]
pub async fn get_recipe(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let recipe = state.recipes.get_recipe(&path.into_inner()).await?;
    Ok(web::Json(RecipeResponse { recipe }))
}

/// List every recipe authored by a user.
#[utoipa::path(
    get,
    path = "/api/v1/recipes/user/{user_id}",
    params(("user_id" = Uuid, Path, description = "Author identifier")),
    responses(
        (status = 200, description = "Recipes found", body = RecipesResponse),
        (status = 404, description = "Unknown user or no recipes", body = crate::domain::Error),
        (status = 500, description = "Internal server error", body = crate::domain::Error)
    ),
    tags = ["recipes"],
    operation_id = "getRecipesForUser",
    security([])
)]
#[get("/recipes/user/{user_id}")]
pub async fn get_user_recipes(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<RecipesResponse>> {
    let user_id = UserId::from_uuid(path.into_inner());
    let recipes = state.recipes.get_recipes_for_user(&user_id).await?;
    Ok(web::Json(RecipesResponse { recipes }))
}

/// Create a recipe owned by the authenticated user.
///
/// The multipart decoding layer has already parked the image in a temp
/// file; the handler validates the text fields, moves the image into the
/// uploads directory, and only then calls into the store. If the store
/// rejects the create, the freshly stored file is discarded again.
#[utoipa::path(
    post,
    path = "/api/v1/recipes",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 401, description = "Login required", body = crate::domain::Error),
        (status = 404, description = "Creator does not exist", body = crate::domain::Error),
        (status = 422, description = "Validation failed", body = crate::domain::Error),
        (status = 500, description = "Internal server error", body = crate::domain::Error)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe"
)]
#[post("/recipes")]
pub async fn create_recipe(
    state: web::Data<HttpState>,
    uploads: web::Data<UploadConfig>,
    session: SessionContext,
    form: MultipartForm<CreateRecipeForm>,
) -> ApiResult<HttpResponse> {
    let creator = session.require_user_id()?;
    let form = form.into_inner();

    let extension = upload::image_extension(&form.image)?;
    let dest = uploads.target_path(extension);
    let draft = RecipeDraft::try_new(
        form.title.into_inner(),
        form.description.into_inner(),
        form.address.into_inner(),
        dest.to_string_lossy(),
        creator,
    )
    .map_err(map_validation_error)?;

    upload::persist_image(form.image, &dest)?;

    match state.recipes.create_recipe(draft).await {
        Ok(recipe) => Ok(HttpResponse::Created().json(RecipeResponse { recipe })),
        Err(error) => {
            discard_stored_image(&state.images, &dest);
            Err(error)
        }
    }
}

/// Replace a recipe's title and description.
#[utoipa::path(
    patch,
    path = "/api/v1/recipes/{id}",
    params(("id" = Uuid, Path, description = "Recipe identifier")),
    request_body = UpdateRecipeRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeResponse),
        (status = 401, description = "Login required or not the creator", body = crate::domain::Error),
        (status = 404, description = "No recipe with this id", body = crate::domain::Error),
        (status = 422, description = "Validation failed", body = crate::domain::Error),
        (status = 500, description = "Internal server error", body = crate::domain::Error)
    ),
    tags = ["recipes"],
    operation_id = "updateRecipe"
)]
#[patch("/recipes/{id}")]
pub async fn update_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateRecipeRequest>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let requester = session.require_user_id()?;
    let payload = payload.into_inner();
    let revision =
        RecipeRevision::try_new(payload.title, payload.description).map_err(map_validation_error)?;
    let recipe = state
        .recipes
        .update_recipe(&path.into_inner(), revision, &requester)
        .await?;
    Ok(web::Json(RecipeResponse { recipe }))
}

/// Delete a recipe and its stored image.
#[utoipa::path(
    delete,
    path = "/api/v1/recipes/{id}",
    params(("id" = Uuid, Path, description = "Recipe identifier")),
    responses(
        (status = 200, description = "Recipe deleted", body = MessageResponse),
        (status = 401, description = "Login required or not the creator", body = crate::domain::Error),
        (status = 404, description = "No recipe with this id", body = crate::domain::Error),
        (status = 500, description = "Internal server error", body = crate::domain::Error)
    ),
    tags = ["recipes"],
    operation_id = "deleteRecipe"
)]
#[delete("/recipes/{id}")]
pub async fn delete_recipe(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<MessageResponse>> {
    let requester = session.require_user_id()?;
    state
        .recipes
        .delete_recipe(&path.into_inner(), &requester)
        .await?;
    Ok(web::Json(MessageResponse {
        message: "Deleted recipe.".to_owned(),
    }))
}
