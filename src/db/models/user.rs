//! User model and roles.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Coarse permission tiers. `Shopkeeper` administers users and the catalog,
/// `Assistant` is the standard tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Shopkeeper,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Shopkeeper => "Shopkeeper",
            Role::Assistant => "Assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    // Exact spellings only; the role set is closed.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Shopkeeper" => Ok(Role::Shopkeeper),
            "Assistant" => Ok(Role::Assistant),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// Parse the stored role, falling back to the least-privileged tier for
    /// rows written before the role set was enforced.
    pub fn role_enum(&self) -> Role {
        self.role.parse().unwrap_or(Role::Assistant)
    }
}

/// Public view of a user; never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    #[serde(default)]
    pub role: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        assert_eq!("Shopkeeper".parse::<Role>().unwrap(), Role::Shopkeeper);
        assert_eq!("Assistant".parse::<Role>().unwrap(), Role::Assistant);
        assert_eq!(Role::Shopkeeper.to_string(), "Shopkeeper");
        assert_eq!(Role::Assistant.to_string(), "Assistant");
    }

    #[test]
    fn test_role_rejects_unknown_and_case_variants() {
        assert!("Manager".parse::<Role>().is_err());
        assert!("shopkeeper".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_user_response_drops_hash() {
        let user = User {
            id: "u1".to_string(),
            name: "Ama".to_string(),
            email: "ama@example.com".to_string(),
            password_hash: "$argon2id$...".to_string(),
            role: "Assistant".to_string(),
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        };
        let response = UserResponse::from(user);
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("argon2"));
        assert!(json.contains("ama@example.com"));
    }
}
