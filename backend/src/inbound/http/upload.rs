//! Image upload handling for recipe creation.
//!
//! The multipart form is decoded into a temp file before the handler runs;
//! this module validates the image's media type and moves the temp file to
//! its durable location. Downstream code only ever sees the resulting path
//! string, so the recipe store stays ignorant of multipart concerns.

use std::path::{Path, PathBuf};

use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};
use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;

/// Multipart payload for `POST /api/v1/recipes`.
#[derive(Debug, MultipartForm)]
pub struct CreateRecipeForm {
    /// Recipe title field.
    pub title: Text<String>,
    /// Recipe description field.
    pub description: Text<String>,
    /// Recipe address field.
    pub address: Text<String>,
    /// Uploaded image file.
    #[multipart(limit = "10MB")]
    pub image: TempFile,
}

/// Destination directory for persisted recipe images.
#[derive(Debug, Clone)]
pub struct UploadConfig {
    dir: PathBuf,
}

impl UploadConfig {
    /// Configure the directory uploads are persisted into.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Fresh destination path for an upload with the given extension.
    pub fn target_path(&self, extension: &str) -> PathBuf {
        self.dir.join(format!("{}.{extension}", Uuid::new_v4()))
    }
}

/// Map the upload's media type onto a file extension.
///
/// Only png and jpeg images are accepted, as the upload contract has always
/// promised.
pub fn image_extension(image: &TempFile) -> Result<&'static str, Error> {
    let essence = image
        .content_type
        .as_ref()
        .map(|mime| mime.essence_str().to_owned());
    match essence.as_deref() {
        Some("image/png") => Ok("png"),
        Some("image/jpeg") => Ok("jpg"),
        _ => Err(
            Error::invalid_request("image must be a png or jpeg file").with_details(json!({
                "field": "image",
                "code": "invalid_mime_type",
            })),
        ),
    }
}

/// Move the decoded temp file to its durable destination.
pub fn persist_image(image: TempFile, dest: &Path) -> Result<(), Error> {
    image
        .file
        .persist(dest)
        .map(drop)
        .map_err(|err| Error::internal(format!("failed to store uploaded image: {err}")))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn target_paths_are_unique_per_call() {
        let config = UploadConfig::new("uploads");
        let first = config.target_path("png");
        let second = config.target_path("png");
        assert_ne!(first, second);
        assert!(first.starts_with("uploads"));
        assert_eq!(first.extension().and_then(|e| e.to_str()), Some("png"));
    }
}
