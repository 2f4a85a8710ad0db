//! Offline bearer token validation
//!
//! The dashboard never verifies token signatures itself; the API does that on
//! every request. What the client needs is a cheap local answer to "is this
//! token still worth presenting?", decided from the payload's `exp` claim.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use chrono::Utc;
use hireboard_types::Claims;
use serde_json::Value;
use std::sync::Arc;

use crate::{ExpiryPolicy, SessionError};

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);

/// Base64url with optional padding (what JWTs use)
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

/// Standard base64 with optional padding (what some issuers emit anyway)
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// Wall-clock source in epoch seconds
pub trait Clock: Send + Sync {
    /// Current time as seconds since the Unix epoch
    fn now(&self) -> i64;
}

/// System wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        Utc::now().timestamp()
    }
}

/// Clock pinned to a fixed instant
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now(&self) -> i64 {
        self.0
    }
}

/// Split a token into its three segments
fn split_token(token: &str) -> Result<[&str; 3], SessionError> {
    let mut parts = token.split('.');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(header), Some(payload), Some(signature), None) => Ok([header, payload, signature]),
        _ => Err(SessionError::InvalidToken),
    }
}

/// Decode one base64 segment, accepting either alphabet
fn decode_segment(segment: &str) -> Result<Vec<u8>, SessionError> {
    URL_SAFE_LENIENT
        .decode(segment)
        .or_else(|_| STANDARD_LENIENT.decode(segment))
        .map_err(|_| SessionError::InvalidToken)
}

/// Read the `exp` claim; `Ok(None)` when absent or null
fn expiry_of(claims: &Claims) -> Result<Option<f64>, SessionError> {
    let exp = match claims.get("exp") {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };

    match exp {
        Some(exp) if exp.is_finite() => Ok(Some(exp)),
        _ => Err(SessionError::InvalidToken),
    }
}

/// Decode the payload segment of a token into claims.
///
/// No signature or expiry checks are made.
pub fn decode_claims(token: &str) -> Result<Claims, SessionError> {
    let [_, payload, _] = split_token(token)?;
    let bytes = decode_segment(payload)?;
    let value: Value = serde_json::from_slice(&bytes).map_err(|_| SessionError::InvalidToken)?;
    Claims::try_from(value).map_err(|_| SessionError::InvalidToken)
}

/// Offline token validator
#[derive(Clone)]
pub struct TokenValidator {
    policy: ExpiryPolicy,
    clock: Arc<dyn Clock>,
}

impl TokenValidator {
    /// Create a validator using the system clock
    pub fn new(policy: ExpiryPolicy) -> Self {
        Self::with_clock(policy, Arc::new(SystemClock))
    }

    /// Create a validator with a custom clock
    pub fn with_clock(policy: ExpiryPolicy, clock: Arc<dyn Clock>) -> Self {
        Self { policy, clock }
    }

    /// Decide whether the token is still usable. Fails closed.
    pub fn is_valid(&self, token: &str) -> bool {
        match self.check(token) {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("Token rejected: {}", e);
                false
            }
        }
    }

    /// Validate the token and return its claims
    pub fn check(&self, token: &str) -> Result<Claims, SessionError> {
        let claims = decode_claims(token)?;

        match expiry_of(&claims)? {
            Some(exp) if exp > self.clock.now() as f64 => Ok(claims),
            Some(_) => Err(SessionError::TokenExpired),
            None => match self.policy {
                ExpiryPolicy::AllowMissing => Ok(claims),
                ExpiryPolicy::RequireExpiry => {
                    tracing::debug!("Token has no exp claim and expiry is required");
                    Err(SessionError::InvalidToken)
                }
            },
        }
    }
}

impl Default for TokenValidator {
    fn default() -> Self {
        Self::new(ExpiryPolicy::default())
    }
}

impl std::fmt::Debug for TokenValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenValidator")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}
