//! Configuration types for the session layer

use crate::SessionError;

/// Secret used when none is configured, matching the dashboard's fallback
pub const DEFAULT_SECRET_KEY: &str = "default_secret_key";

/// Storage key holding the raw bearer token
pub const DEFAULT_TOKEN_KEY: &str = "token";

/// Storage key holding the encrypted claims snapshot
pub const DEFAULT_CLAIMS_KEY: &str = "userData";

/// How to treat tokens whose payload carries no `exp` claim
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpiryPolicy {
    /// Tokens without `exp` never expire
    #[default]
    AllowMissing,
    /// Tokens without `exp` are rejected
    RequireExpiry,
}

/// Session layer configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Secret the claims encryption key is derived from
    pub secret_key: String,
    /// Storage key for the raw token
    pub token_key: String,
    /// Storage key for the encrypted claims
    pub claims_key: String,
    /// Expiry policy for tokens without `exp`
    pub expiry_policy: ExpiryPolicy,
}

impl SessionConfig {
    /// Create a new session config with the default key names
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            secret_key: secret_key.into(),
            token_key: DEFAULT_TOKEN_KEY.to_string(),
            claims_key: DEFAULT_CLAIMS_KEY.to_string(),
            expiry_policy: ExpiryPolicy::default(),
        }
    }

    /// Whether the built-in fallback secret is in use
    pub fn uses_default_secret(&self) -> bool {
        self.secret_key == DEFAULT_SECRET_KEY
    }

    /// Set the expiry policy
    #[must_use]
    pub fn with_expiry_policy(mut self, policy: ExpiryPolicy) -> Self {
        self.expiry_policy = policy;
        self
    }

    /// Set the storage key names
    #[must_use]
    pub fn with_keys(mut self, token_key: impl Into<String>, claims_key: impl Into<String>) -> Self {
        self.token_key = token_key.into();
        self.claims_key = claims_key.into();
        self
    }

    /// Reject configurations the session store cannot work with
    pub fn validate(&self) -> Result<(), SessionError> {
        if self.secret_key.is_empty() {
            return Err(SessionError::Configuration("secret key is empty".into()));
        }
        if self.token_key.is_empty() || self.claims_key.is_empty() {
            return Err(SessionError::Configuration("storage key is empty".into()));
        }
        if self.token_key == self.claims_key {
            return Err(SessionError::Configuration(format!(
                "token and claims share the storage key {:?}",
                self.token_key
            )));
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SECRET_KEY)
    }
}
