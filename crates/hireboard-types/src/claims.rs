//! Decoded token claims

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::TypesError;

/// Claims decoded from the payload segment of a bearer token.
///
/// The dashboard API does not pin a claims schema, so this is a thin wrapper
/// around a JSON object with accessors for the fields views care about.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// Create empty claims
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a JSON object
    pub fn from_map(map: Map<String, Value>) -> Self {
        Self(map)
    }

    /// Consume into the raw JSON object
    pub fn into_map(self) -> Map<String, Value> {
        self.0
    }

    /// Builder-style insert, mostly for tests and fixtures
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Look up a raw claim
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Look up a claim that holds a string
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// User identifier (`id`, falling back to the registered `sub` claim)
    pub fn id(&self) -> Option<&str> {
        self.get_str("id").or_else(|| self.get_str("sub"))
    }

    /// Display name (`name`, falling back to `full_name`)
    pub fn name(&self) -> Option<&str> {
        self.get_str("name").or_else(|| self.get_str("full_name"))
    }

    /// Email address
    pub fn email(&self) -> Option<&str> {
        self.get_str("email")
    }

    /// Raw role string
    pub fn role(&self) -> Option<&str> {
        self.get_str("role")
    }

    /// Expiration timestamp in epoch seconds, when present and numeric
    pub fn exp(&self) -> Option<i64> {
        match self.0.get("exp")? {
            Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
            _ => None,
        }
    }

    /// Number of claims
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether there are no claims at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Value> for Claims {
    type Error = TypesError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(TypesError::NotAnObject),
        }
    }
}

impl From<Claims> for Value {
    fn from(claims: Claims) -> Self {
        Value::Object(claims.0)
    }
}
