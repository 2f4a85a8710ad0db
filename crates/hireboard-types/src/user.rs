//! User types

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::{Claims, TypesError};

/// Dashboard role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Company administrator (the default for self-registered accounts)
    Admin,
    /// Regular member
    User,
}

impl Role {
    /// Lowercase wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
        }
    }
}

impl FromStr for Role {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "user" => Ok(Self::User),
            _ => Err(TypesError::InvalidRole(s.to_string())),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed view of the signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID
    pub id: String,
    /// Display name (may be empty when the token carries none)
    pub name: String,
    /// Email address (may be empty when the token carries none)
    pub email: String,
    /// Dashboard role
    pub role: Role,
}

impl User {
    /// Build a user view from decoded claims.
    ///
    /// Only `id` (or `sub`) is required. A missing role falls back to
    /// [`Role::User`]; an unknown role is rejected.
    pub fn from_claims(claims: &Claims) -> Result<Self, TypesError> {
        let id = claims.id().ok_or(TypesError::MissingClaim("id"))?;
        let role = match claims.role() {
            Some(r) => r.parse()?,
            None => Role::User,
        };

        Ok(Self {
            id: id.to_string(),
            name: claims.name().unwrap_or_default().to_string(),
            email: claims.email().unwrap_or_default().to_string(),
            role,
        })
    }

    /// Whether the user can manage jobs and candidates
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("USER".parse::<Role>().unwrap(), Role::User);
        assert!(matches!(
            "owner".parse::<Role>(),
            Err(TypesError::InvalidRole(_))
        ));
    }

    #[test]
    fn test_user_from_claims() {
        let claims = Claims::new()
            .with("id", "u1")
            .with("name", "Ada")
            .with("email", "ada@example.com")
            .with("role", "admin");
        let user = User::from_claims(&claims).unwrap();
        assert_eq!(user.id, "u1");
        assert_eq!(user.name, "Ada");
        assert!(user.is_admin());
    }

    #[test]
    fn test_user_from_sparse_claims() {
        let claims = Claims::new().with("sub", "u2");
        let user = User::from_claims(&claims).unwrap();
        assert_eq!(user.id, "u2");
        assert_eq!(user.role, Role::User);
        assert!(user.email.is_empty());
    }

    #[test]
    fn test_user_requires_id() {
        let claims = Claims::new().with("role", "admin");
        assert_eq!(
            User::from_claims(&claims),
            Err(TypesError::MissingClaim("id"))
        );
    }
}
