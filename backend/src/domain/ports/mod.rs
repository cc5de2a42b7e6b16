//! Domain ports: the seams between the core and its adapters.
//!
//! Driving ports ([`RecipeStore`], [`LoginService`]) are called by inbound
//! adapters; driven ports ([`RecipeRepository`], [`UserRepository`],
//! [`ImageStore`]) are implemented by outbound adapters. Handlers and
//! services depend only on these traits, never on concrete infrastructure.

mod image_store;
mod login_service;
mod recipe_repository;
mod recipe_store;
mod user_repository;

pub use image_store::{ImageStore, ImageStoreError};
pub use login_service::{FixtureLoginService, LoginService};
pub use recipe_repository::{RecipePersistenceError, RecipeRepository};
pub use recipe_store::RecipeStore;
pub use user_repository::{UserPersistenceError, UserRepository};

#[cfg(test)]
pub use image_store::MockImageStore;
#[cfg(test)]
pub use recipe_repository::MockRecipeRepository;
#[cfg(test)]
pub use user_repository::MockUserRepository;
