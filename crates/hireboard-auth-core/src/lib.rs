//! Hireboard Auth Core - browser-style session persistence
//!
//! Core session functionality for the dashboard: offline token validation,
//! an encrypted claims cache, the one-shot startup rehydration and the
//! login/logout flows that keep storage and in-memory auth state in step.

pub mod config;
pub mod crypto;
pub mod error;
pub mod rehydrate;
pub mod service;
pub mod state;
pub mod storage;
pub mod store;
pub mod token;

pub use config::*;
pub use crypto::*;
pub use error::*;
pub use rehydrate::*;
pub use service::*;
pub use state::*;
pub use storage::*;
pub use store::*;
pub use token::*;
