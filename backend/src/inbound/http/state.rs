//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{ImageStore, LoginService, RecipeStore};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Authentication use-case establishing sessions.
    pub login: Arc<dyn LoginService>,
    /// Recipe store driving port.
    pub recipes: Arc<dyn RecipeStore>,
    /// Image store used to discard an upload when creation fails after the
    /// file already landed on disk.
    pub images: Arc<dyn ImageStore>,
}

impl HttpState {
    /// Bundle the port implementations handlers depend on.
    pub fn new(
        login: Arc<dyn LoginService>,
        recipes: Arc<dyn RecipeStore>,
        images: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            login,
            recipes,
            images,
        }
    }
}
