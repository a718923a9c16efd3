//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the PostgREST backend (no trailing slash)
    pub postgrest_url: String,
    /// Bounded timeout applied to every outgoing request
    pub request_timeout_secs: u64,
    /// Where the bearer token and cached identity are persisted
    pub credentials_path: PathBuf,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            postgrest_url: "http://localhost:3000".to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            credentials_path: PathBuf::from("credentials.json"),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            postgrest_url: env::var("POSTGREST_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .map_err(|_| ConfigError::Missing("POSTGREST_URL"))?,
            request_timeout_secs: env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            credentials_path: env::var("CREDENTIALS_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("credentials.json")),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),
}
