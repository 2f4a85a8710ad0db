//! Common test utilities for hireboard-auth-core integration tests

pub mod tokens;

#[allow(unused_imports)]
pub use tokens::{
    admin_claims, mint_token, mint_token_expiring_in, unsigned_token, validator_at_now, NOW,
};
