//! Common error types

use thiserror::Error;

/// Errors raised while interpreting domain types
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    /// Role string is not one of the known roles
    #[error("invalid role: {0}")]
    InvalidRole(String),

    /// Claims do not carry a field the caller needs
    #[error("missing claim: {0}")]
    MissingClaim(&'static str),

    /// Claims value is not a JSON object
    #[error("claims must be a JSON object")]
    NotAnObject,
}
