//! # sociate-server
//!
//! HTTP API for the Sociate social network.
//!
//! This binary provides:
//! - **Users and follow graph**: sync from the identity provider, profiles
//!   with counters, search, followers/following
//! - **Posts**: creation, likes, comments, and a follow-graph feed with
//!   batched enrichment
//! - **Direct messages**: canonical two-party conversations with paginated
//!   history
//! - **Notifications** generated by likes, comments and follows

mod api;
mod auth;
mod config;
mod db;
mod dto;
mod enrich;
mod error;
mod extract;
mod feed;
mod handlers;
mod middleware;
mod response;

#[cfg(test)]
mod tests;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use sociate_shared::constants::APP_NAME;
use sociate_store::Database;

use crate::api::AppState;
use crate::auth::IdentityVerifier;
use crate::config::ServerConfig;
use crate::db::StoreHandle;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,sociate_server=debug,sociate_store=info")
        }))
        .init();

    info!("Starting {} API server v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration
    // -----------------------------------------------------------------------
    let config = ServerConfig::from_env()?;
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 3. Initialize subsystems
    // -----------------------------------------------------------------------

    // Schema migrations run once here; requests open their own connections.
    let db_path = match &config.database_path {
        Some(path) => path.clone(),
        None => Database::default_path()?,
    };
    Database::init(&db_path)?;
    let store = StoreHandle::new(db_path);
    info!(path = %store.path().display(), "Store ready");

    let identity = IdentityVerifier::new(config.identity_pubkey, config.require_auth);
    if !identity.is_verified() {
        warn!("IDENTITY_PUBKEY not set: bearer values are trusted as user ids");
    }

    let app_state = AppState { store, identity };

    // -----------------------------------------------------------------------
    // 4. Run the HTTP API server (blocks until shutdown)
    // -----------------------------------------------------------------------
    tokio::select! {
        result = api::serve(app_state, config.http_addr, config.max_body_bytes) => {
            if let Err(e) = result {
                tracing::error!(error = %e, "HTTP server failed");
                return Err(e);
            }
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Received Ctrl+C, shutting down");
        }
    }

    Ok(())
}
