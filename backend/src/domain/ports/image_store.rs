//! Port abstraction for stored recipe images.
//!
//! The core only ever removes images: persisting an upload happens in the
//! inbound adapter before the store runs, and the stored path string is the
//! whole interface between the two.

use async_trait::async_trait;

/// Errors raised by image store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ImageStoreError {
    /// The underlying file operation failed.
    #[error("image store i/o failed for {path}: {message}")]
    Io {
        /// Path the operation targeted.
        path: String,
        /// Adapter-level failure description.
        message: String,
    },
}

impl ImageStoreError {
    /// I/O-failure constructor.
    pub fn io(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Io {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Driven port for removing stored recipe images.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Remove the image at `path`.
    ///
    /// Callers treat failure as observable-but-ignorable: deletion runs
    /// after the owning transaction has committed and is never retried.
    async fn remove(&self, path: &str) -> Result<(), ImageStoreError>;
}
