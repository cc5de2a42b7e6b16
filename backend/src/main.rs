//! Backend entry-point: configuration, persistence wiring, and server start.

use std::env;
use std::sync::Arc;

use actix_web::cookie::Key;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use backend::domain::RecipeService;
use backend::inbound::http::state::HttpState;
use backend::outbound::files::FsImageStore;
use backend::outbound::persistence::{
    DbPool, DieselLoginService, DieselRecipeRepository, DieselUserRepository, PoolConfig,
    run_pending_migrations,
};
use backend::server::{ServerConfig, run};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let database_url = env::var("DATABASE_URL")
        .map_err(|_| std::io::Error::other("DATABASE_URL must be set"))?;

    // Diesel's migration harness is synchronous; run it off the runtime
    // before accepting traffic.
    {
        let database_url = database_url.clone();
        tokio::task::spawn_blocking(move || run_pending_migrations(&database_url))
            .await
            .map_err(std::io::Error::other)?
            .map_err(std::io::Error::other)?;
    }

    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .map_err(std::io::Error::other)?;

    let key = load_session_key()?;
    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);
    let bind_addr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_owned())
        .parse()
        .map_err(|err| std::io::Error::other(format!("invalid BIND_ADDR: {err}")))?;
    let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_owned());
    std::fs::create_dir_all(&upload_dir)?;

    let recipes = RecipeService::new(
        Arc::new(DieselRecipeRepository::new(pool.clone())),
        Arc::new(FsImageStore),
    );
    let state = HttpState::new(
        Arc::new(DieselLoginService::new(DieselUserRepository::new(
            pool.clone(),
        ))),
        Arc::new(recipes),
        Arc::new(FsImageStore),
    );

    let config = ServerConfig::new(key, cookie_secure, bind_addr).with_upload_dir(upload_dir);
    run(config, state)?.await
}

/// Load the session signing key, falling back to an ephemeral key in
/// development builds only.
fn load_session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".to_owned());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}
