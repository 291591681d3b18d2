//! Account model for local (password) logins.

use serde::{Deserialize, Serialize};

/// User role. The system knows exactly two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Worker,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Worker => "worker",
        }
    }

    /// Landing page for this role after a successful login.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Admin => "/dashboard",
            Role::Worker => "/alerts",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account record held by the account store.
///
/// `username` is stored normalized (trimmed, lower-cased) and is unique under
/// that normalization. The password is only ever held as a bcrypt hash.
#[derive(Debug, Clone)]
pub struct Account {
    /// Stable subject identifier carried into issued credentials.
    pub subject_id: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Normalize a username for lookup and uniqueness: trim and lower-case.
pub fn normalize_username(raw: &str) -> String {
    raw.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("  Admin "), "admin");
        assert_eq!(normalize_username("WORKER1"), "worker1");
    }

    #[test]
    fn test_role_home_path() {
        assert_eq!(Role::Admin.home_path(), "/dashboard");
        assert_eq!(Role::Worker.home_path(), "/alerts");
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        let role: Role = serde_json::from_str("\"worker\"").unwrap();
        assert_eq!(role, Role::Worker);
    }
}
