//! Server configuration loaded from environment variables.
//!
//! All settings have sensible defaults so the server can start with zero
//! configuration for local development. A malformed value is logged and
//! replaced by its default, except for the identity key: a server that was
//! asked to verify callers refuses to start rather than trust them.

use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

use sociate_shared::constants::{DEFAULT_HTTP_PORT, DEFAULT_MAX_BODY_BYTES};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid IDENTITY_PUBKEY: {0}")]
    IdentityPubkey(String),
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address for the HTTP (axum) API server.
    /// Env: `HTTP_ADDR`
    /// Default: `0.0.0.0:8787`
    pub http_addr: SocketAddr,

    /// SQLite database file.
    /// Env: `DATABASE_PATH`
    /// Default: `None`, meaning the platform data directory.
    pub database_path: Option<PathBuf>,

    /// Ed25519 public key of the identity issuer (hex-encoded, 64 chars).
    /// When unset, bearer values are taken as user ids without verification.
    /// Env: `IDENTITY_PUBKEY`
    pub identity_pubkey: Option<[u8; 32]>,

    /// Whether mutations must carry a bearer identity.
    /// Env: `REQUIRE_AUTH` (true/false)
    /// Default: `false`
    pub require_auth: bool,

    /// Request body limit in bytes.
    /// Env: `MAX_BODY_BYTES`
    /// Default: 1 MiB
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: ([0, 0, 0, 0], DEFAULT_HTTP_PORT).into(),
            database_path: None,
            identity_pubkey: None,
            require_auth: false,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(addr) = lookup("HTTP_ADDR") {
            if let Ok(parsed) = addr.parse::<SocketAddr>() {
                config.http_addr = parsed;
            } else {
                tracing::warn!(value = %addr, "Invalid HTTP_ADDR, using default");
            }
        }

        if let Some(path) = lookup("DATABASE_PATH") {
            if !path.is_empty() {
                config.database_path = Some(PathBuf::from(path));
            }
        }

        if let Some(hex_key) = lookup("IDENTITY_PUBKEY") {
            if !hex_key.trim().is_empty() {
                let key = parse_hex_pubkey(&hex_key).map_err(ConfigError::IdentityPubkey)?;
                config.identity_pubkey = Some(key);
            }
        }

        if let Some(val) = lookup("REQUIRE_AUTH") {
            config.require_auth = val == "true" || val == "1";
        }

        if let Some(val) = lookup("MAX_BODY_BYTES") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.max_body_bytes = n,
                _ => tracing::warn!(value = %val, "Invalid MAX_BODY_BYTES, using default"),
            }
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        Ok(config)
    }
}

/// Parse a 64-character hex string into a 32-byte array.
fn parse_hex_pubkey(hex: &str) -> Result<[u8; 32], String> {
    let hex = hex.trim();
    if hex.len() != 64 {
        return Err(format!("expected 64 hex chars, got {}", hex.len()));
    }

    let bytes = hex::decode(hex).map_err(|e| format!("invalid hex: {e}"))?;
    let mut key = [0u8; 32];
    key.copy_from_slice(&bytes);
    Ok(key)
}
