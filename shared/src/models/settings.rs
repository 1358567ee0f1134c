//! Shop Settings Model (单行配置)

use serde::{Deserialize, Serialize};

/// Shop-wide settings, single row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ShopSettings {
    pub shop_name: String,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub address: Option<String>,
    /// Per-unit deposit ceiling for single items
    pub single_item_deposit_cap: f64,
    /// Flat deposit per package
    pub package_deposit: f64,
    /// Variations at or below this quantity are reported as low stock
    pub low_stock_threshold: i64,
    /// Bookable HH:MM slots
    #[cfg_attr(feature = "db", sqlx(json))]
    pub appointment_slots: Vec<String>,
    /// Max open appointments per date+slot
    pub appointment_slot_capacity: i64,
    pub updated_at: i64,
}

/// Update settings payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopSettingsUpdate {
    pub shop_name: Option<String>,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub address: Option<String>,
    pub single_item_deposit_cap: Option<f64>,
    pub package_deposit: Option<f64>,
    pub low_stock_threshold: Option<i64>,
    pub appointment_slots: Option<Vec<String>>,
    pub appointment_slot_capacity: Option<i64>,
}

/// Storefront view of the settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicShopInfo {
    pub shop_name: String,
    pub contact_phone: Option<String>,
    pub contact_email: Option<String>,
    pub address: Option<String>,
    pub single_item_deposit_cap: f64,
    pub package_deposit: f64,
    pub appointment_slots: Vec<String>,
}

impl From<ShopSettings> for PublicShopInfo {
    fn from(s: ShopSettings) -> Self {
        Self {
            shop_name: s.shop_name,
            contact_phone: s.contact_phone,
            contact_email: s.contact_email,
            address: s.address,
            single_item_deposit_cap: s.single_item_deposit_cap,
            package_deposit: s.package_deposit,
            appointment_slots: s.appointment_slots,
        }
    }
}
