//! Employee Model

use serde::{Deserialize, Serialize};
use std::fmt;

/// Back-office role
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum EmployeeRole {
    Admin,
    Staff,
}

impl EmployeeRole {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Staff => "staff",
        }
    }
}

impl fmt::Display for EmployeeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Employee entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Employee {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    /// Argon2 PHC string, never sent to clients
    #[serde(skip_serializing, default)]
    pub hash_pass: String,
    pub role: EmployeeRole,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create employee payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmployeeCreate {
    pub username: String,
    pub password: String,
    pub display_name: Option<String>,
    pub role: EmployeeRole,
}

/// Update employee payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EmployeeUpdate {
    pub display_name: Option<String>,
    pub password: Option<String>,
    pub role: Option<EmployeeRole>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_not_serialized() {
        let emp = Employee {
            id: 1,
            username: "admin".into(),
            display_name: "Admin".into(),
            hash_pass: "$argon2id$secret".into(),
            role: EmployeeRole::Admin,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        };
        let json = serde_json::to_string(&emp).unwrap();
        assert!(!json.contains("hash_pass"));
        assert!(!json.contains("argon2"));
        assert!(json.contains("\"role\":\"admin\""));
    }
}
