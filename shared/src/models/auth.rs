//! Auth DTOs

use serde::{Deserialize, Serialize};

use super::employee::EmployeeRole;

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Logged-in employee as seen by the client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
    pub display_name: String,
    pub role: EmployeeRole,
    pub permissions: Vec<String>,
}

/// Login response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: UserInfo,
}
