//! Domain primitives, ports, and services.
//!
//! Purpose: define the strongly typed entities used by the API and
//! persistence layers, the ports that decouple them, and the recipe store
//! service that enforces the cross-record consistency contract. Keep types
//! immutable and document invariants and serialisation contracts (serde) in
//! each type's Rustdoc.

pub mod auth;
pub mod error;
pub mod ports;
pub mod recipe;
pub mod recipes;
pub mod user;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::recipe::{
    DESCRIPTION_MIN, Recipe, RecipeDraft, RecipeRevision, RecipeValidationError,
};
pub use self::recipes::RecipeService;
pub use self::user::{DisplayName, User, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use actix_web::HttpResponse;
/// use backend::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<HttpResponse> {
///     Err(Error::not_found("nope"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
