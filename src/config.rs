//! Application configuration loaded from environment variables.
//!
//! Everything is read once at startup and cached in memory. Secrets
//! (JWT signing key, cron secret, Asana credentials) come from the
//! environment; in production they are injected by the deployment platform.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Frontend URL for CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Bearer secret protecting the /cron/* sweep endpoints
    pub cron_secret: String,
    /// Asana personal access token (optional; Asana sync disabled if unset)
    pub asana_token: Option<String>,
    /// Asana webhook secret captured during the webhook handshake
    /// (optional; signature verification skipped until set)
    pub asana_webhook_secret: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            cron_secret: env::var("CRON_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("CRON_SECRET"))?,
            asana_token: env::var("ASANA_TOKEN")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            asana_webhook_secret: env::var("ASANA_WEBHOOK_SECRET")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
        })
    }

    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            cron_secret: "test_cron_secret".to_string(),
            asana_token: None,
            asana_webhook_secret: Some("test_webhook_secret".to_string()),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
