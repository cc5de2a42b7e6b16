//! HTTP server configuration object and helpers.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use actix_web::cookie::{Key, SameSite};

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) upload_dir: PathBuf,
}

impl ServerConfig {
    /// Construct a server configuration using application preferences.
    ///
    /// Defaults: `SameSite::Lax` cookies and an `uploads` directory next to
    /// the working directory.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site: SameSite::Lax,
            bind_addr,
            upload_dir: PathBuf::from("uploads"),
        }
    }

    /// Override the session cookie's `SameSite` attribute.
    #[must_use]
    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    /// Override the directory uploaded images are persisted into.
    #[must_use]
    pub fn with_upload_dir(mut self, upload_dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = upload_dir.into();
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }

    /// Return the configured upload directory.
    #[must_use]
    pub fn upload_dir(&self) -> &Path {
        self.upload_dir.as_path()
    }
}
