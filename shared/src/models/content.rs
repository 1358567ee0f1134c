//! Content Block Model (FAQ, about, banners, policies)

use serde::{Deserialize, Serialize};

/// Keyed piece of storefront content
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ContentBlock {
    /// Stable key, e.g. `faq`, `about`, `hero_banner`
    pub key: String,
    pub title: String,
    pub body: String,
    pub image: Option<String>,
    pub is_published: bool,
    pub updated_at: i64,
}

/// Create-or-replace payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentUpsert {
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub image: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}
