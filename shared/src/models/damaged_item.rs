//! Damaged Item Model

use serde::{Deserialize, Serialize};

/// Damage record status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum DamageStatus {
    AwaitingRepair,
    /// Back on the shelf
    Repaired,
    /// Written off
    Disposed,
}

/// Garment returned damaged; kept off the shelf until resolved
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct DamagedItem {
    pub id: i64,
    pub rental_id: i64,
    pub rental_reference: String,
    pub item_id: i64,
    pub item_name: String,
    pub variation_id: i64,
    pub color: String,
    pub size: String,
    pub quantity: i64,
    pub notes: Option<String>,
    pub status: DamageStatus,
    pub created_at: i64,
    pub resolved_at: Option<i64>,
}

/// Resolve damage payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageResolve {
    /// `repaired` or `disposed`
    pub status: DamageStatus,
    pub notes: Option<String>,
}
