//! Recipe store domain services.

pub mod service;
#[cfg(test)]
mod service_tests;

pub use service::RecipeService;
