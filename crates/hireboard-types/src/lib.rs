//! Hireboard Types - Shared domain types
//!
//! This crate contains domain types used across the Hireboard session layer:
//! - Decoded token claims
//! - Dashboard user identity and roles

pub mod claims;
pub mod user;
pub mod error;

pub use claims::*;
pub use user::*;
pub use error::*;
