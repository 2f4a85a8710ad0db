//! Configuration for the session CLI.

use hireboard_auth_core::{ExpiryPolicy, SessionConfig, SessionError, DEFAULT_SECRET_KEY};
use std::path::PathBuf;

/// Session CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Session core configuration
    pub session: SessionConfig,

    /// File the session is persisted to
    pub session_file: PathBuf,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Encryption secret (the dashboard falls back to a fixed default when unset)
        let secret_key =
            lookup("HIREBOARD_SECRET_KEY").unwrap_or_else(|| DEFAULT_SECRET_KEY.to_string());

        // Session file (default: per-user data directory)
        let session_file = match lookup("HIREBOARD_SESSION_FILE").filter(|s| !s.is_empty()) {
            Some(path) => PathBuf::from(path),
            None => dirs::data_local_dir()
                .map(|dir| dir.join("hireboard").join("session.json"))
                .ok_or(ConfigError::Missing("HIREBOARD_SESSION_FILE"))?,
        };

        // Expiry policy for tokens without `exp`
        let require_expiry = match lookup("HIREBOARD_REQUIRE_TOKEN_EXPIRY") {
            Some(raw) => hireboard_utils::parse_flag(&raw)
                .ok_or(ConfigError::Invalid("HIREBOARD_REQUIRE_TOKEN_EXPIRY"))?,
            None => false,
        };
        let expiry_policy = if require_expiry {
            ExpiryPolicy::RequireExpiry
        } else {
            ExpiryPolicy::AllowMissing
        };

        let session = SessionConfig::new(secret_key).with_expiry_policy(expiry_policy);
        session.validate()?;

        Ok(Self {
            session,
            session_file,
        })
    }

    /// Override the session file
    #[must_use]
    pub fn with_session_file(mut self, path: PathBuf) -> Self {
        self.session_file = path;
        self
    }
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error(transparent)]
    Session(#[from] SessionError),
}
