//! Test token minting

#![allow(dead_code)]

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use hireboard_auth_core::{ExpiryPolicy, FixedClock, TokenValidator};
use hireboard_types::Claims;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::Value;
use std::sync::Arc;

/// Fixed "now" used by validators built in tests
pub const NOW: i64 = 1_750_000_000;

/// Secret the fake API signs tokens with (never checked client-side)
const API_SIGNING_SECRET: &[u8] = b"hireboard-api-signing-secret-for-tests";

/// Claims for the canonical admin user
pub fn admin_claims() -> Claims {
    Claims::new().with("id", "u1").with("role", "admin")
}

/// Mint an HS256 token the way the API does
pub fn mint_token(claims: &Claims) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(API_SIGNING_SECRET),
    )
    .expect("test token encodes")
}

/// Mint a token for `claims` with `exp = NOW + offset_secs`
pub fn mint_token_expiring_in(claims: &Claims, offset_secs: i64) -> String {
    mint_token(&claims.clone().with("exp", NOW + offset_secs))
}

/// Build a token around an arbitrary JSON payload without signing it
pub fn unsigned_token(payload: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).expect("payload serializes"));
    format!("{header}.{body}.")
}

/// Validator pinned to [`NOW`]
pub fn validator_at_now(policy: ExpiryPolicy) -> TokenValidator {
    TokenValidator::with_clock(policy, Arc::new(FixedClock(NOW)))
}
