//! Item & Variation Model (衣物库存)

use serde::{Deserialize, Serialize};

/// Rentable garment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    /// Rental price per unit
    pub price: f64,
    pub image: Option<String>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub variations: Vec<ItemVariation>,
}

/// Color/size combination of an item, the unit stock is counted in
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ItemVariation {
    pub id: i64,
    pub item_id: i64,
    pub color: String,
    pub size: String,
    /// Units on the shelf (never negative)
    pub quantity: i64,
}

/// Variation payload used when creating an item or adding a variation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariationCreate {
    pub color: String,
    pub size: String,
    #[serde(default)]
    pub quantity: i64,
}

/// Update variation payload (stock changes go through [`StockAdjustment`])
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VariationUpdate {
    pub color: Option<String>,
    pub size: Option<String>,
}

/// Create item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemCreate {
    pub name: String,
    pub category: String,
    pub description: Option<String>,
    pub price: f64,
    pub image: Option<String>,
    #[serde(default)]
    pub variations: Vec<VariationCreate>,
}

/// Update item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub is_active: Option<bool>,
}

/// Manual stock correction (restock, shrinkage, stocktake)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockAdjustment {
    /// Signed change applied to the shelf quantity
    pub delta: i64,
    pub reason: Option<String>,
}

/// Variation at or below the low-stock threshold
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct LowStockVariation {
    pub variation_id: i64,
    pub item_id: i64,
    pub item_name: String,
    pub color: String,
    pub size: String,
    pub quantity: i64,
}
