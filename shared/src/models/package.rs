//! Package Model (套装)

use serde::{Deserialize, Serialize};

/// Bundle of garments rented at one price (e.g. "Wedding entourage set")
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Package {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    /// Free-text list of what the package contains
    #[cfg_attr(feature = "db", sqlx(json))]
    pub inclusions: Vec<String>,
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create package payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageCreate {
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub inclusions: Vec<String>,
    pub image: Option<String>,
}

/// Update package payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub inclusions: Option<Vec<String>>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}
