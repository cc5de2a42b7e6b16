//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: all recipe and login endpoints, the health probes, the
//! shared error schema, and the session-cookie security scheme. The
//! generated specification backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Recipes backend API",
        description = "HTTP interface for recipe CRUD with session-authenticated mutations."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::recipes::get_recipe,
        crate::inbound::http::recipes::get_user_recipes,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::update_recipe,
        crate::inbound::http::recipes::delete_recipe,
        crate::inbound::http::users::login,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        crate::domain::Error,
        crate::domain::ErrorCode,
        crate::domain::Recipe,
        crate::domain::User,
        crate::inbound::http::recipes::RecipeResponse,
        crate::inbound::http::recipes::RecipesResponse,
        crate::inbound::http::recipes::MessageResponse,
        crate::inbound::http::recipes::UpdateRecipeRequest,
        crate::inbound::http::users::LoginRequest,
    ))
)]
pub struct ApiDoc;
