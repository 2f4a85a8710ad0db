//! Session errors

use thiserror::Error;

/// Session errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Invalid token (wrong shape, undecodable payload, bad expiry field)
    #[error("invalid token")]
    InvalidToken,

    /// Token has expired
    #[error("token expired")]
    TokenExpired,

    /// Claims could not be parsed or serialized
    #[error("malformed claims: {0}")]
    MalformedClaims(String),

    /// Claims could not be encrypted
    #[error("encryption failed: {0}")]
    Encryption(String),

    /// Ciphertext could not be decrypted (wrong key, tampered, truncated)
    #[error("decryption failed")]
    Decryption,

    /// Storage backend failure
    #[error("storage error: {0}")]
    Storage(String),

    /// Rehydration was already started for this auth state
    #[error("auth state already initialized")]
    AlreadyInitialized,

    /// Configuration error
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl SessionError {
    /// Get a stable error code for logs and CLI output
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::MalformedClaims(_) => "MALFORMED_CLAIMS",
            Self::Encryption(_) => "ENCRYPTION_ERROR",
            Self::Decryption => "DECRYPTION_ERROR",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::AlreadyInitialized => "ALREADY_INITIALIZED",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Whether this error means "the persisted session is unusable"
    pub fn invalidates_session(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken | Self::TokenExpired | Self::MalformedClaims(_) | Self::Decryption
        )
    }
}

impl From<std::io::Error> for SessionError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage(err.to_string())
    }
}

impl From<hireboard_types::TypesError> for SessionError {
    fn from(err: hireboard_types::TypesError) -> Self {
        Self::MalformedClaims(err.to_string())
    }
}
