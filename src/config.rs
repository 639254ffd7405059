//! Application configuration loaded from environment variables.
//!
//! Only the database location can stop the process at boot. Missing OAuth
//! client credentials are carried as `None` and reported when a login is
//! actually attempted, so the rest of the service stays reachable.

use std::env;

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Google OAuth client ID (absent until the operator registers one)
    pub google_client_id: Option<String>,
    /// Google OAuth client secret
    pub google_client_secret: Option<String>,
    /// Redirect URI registered with the OAuth client
    pub redirect_uri: String,
    /// Public base URL shown in setup instructions
    pub base_url: String,
    /// SQLite database URL
    pub database_url: String,
    /// Cookie-session signing secret (kept for deployment parity; generated
    /// when unset)
    pub session_secret: String,
    /// Server port
    pub port: u16,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            google_client_id: Some("test_client_id".to_string()),
            google_client_secret: Some("test_client_secret".to_string()),
            redirect_uri: "http://localhost:8080/oauth/callback".to_string(),
            base_url: "http://localhost:8080".to_string(),
            database_url: "sqlite::memory:".to_string(),
            session_secret: "test_session_secret".to_string(),
            port: 8080,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid("PORT", raw))?,
            Err(_) => 8080,
        };

        Ok(Self {
            google_client_id: non_empty(env::var("GOOGLE_CLIENT_ID").ok()),
            google_client_secret: non_empty(env::var("GOOGLE_CLIENT_SECRET").ok()),
            redirect_uri: env::var("GOOGLE_REDIRECT_URI")
                .unwrap_or_else(|_| "http://localhost:8080/oauth/callback".to_string()),
            base_url: env::var("BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:gsc_tokens.db".to_string()),
            session_secret: match env::var("SESSION_SECRET") {
                Ok(v) => v.trim().to_string(),
                Err(_) => crate::token::random_urlsafe(32).map_err(|_| ConfigError::Rng)?,
            },
            port,
        })
    }

    /// Both OAuth client credentials, or `None` if either is unconfigured.
    pub fn oauth_client(&self) -> Option<(&str, &str)> {
        match (&self.google_client_id, &self.google_client_secret) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),

    #[error("System RNG unavailable")]
    Rng,
}
