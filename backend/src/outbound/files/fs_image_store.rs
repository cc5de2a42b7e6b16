//! Filesystem-backed [`ImageStore`] implementation.

use async_trait::async_trait;

use crate::domain::ports::{ImageStore, ImageStoreError};

/// Removes stored images with `tokio::fs` so the unlink never blocks a
/// request worker.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsImageStore;

#[async_trait]
impl ImageStore for FsImageStore {
    async fn remove(&self, path: &str) -> Result<(), ImageStoreError> {
        tokio::fs::remove_file(path)
            .await
            .map_err(|err| ImageStoreError::io(path, err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn removes_an_existing_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("a.png");
        std::fs::write(&path, b"png bytes").expect("write fixture file");

        FsImageStore
            .remove(&path.to_string_lossy())
            .await
            .expect("removal succeeds");
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn missing_file_surfaces_as_io_error() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing.png");

        let err = FsImageStore
            .remove(&path.to_string_lossy())
            .await
            .expect_err("nothing to remove");
        let ImageStoreError::Io { path: reported, .. } = err;
        assert_eq!(reported, path.to_string_lossy());
    }
}
