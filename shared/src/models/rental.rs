//! Rental Model (租赁单)
//!
//! A rental carries three kinds of lines (single items, packages, custom
//! tailoring) plus payments. Line prices are snapshots taken when the line is
//! written, so later catalog price changes never alter an existing rental.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::customer::CustomerInfo;
use super::damaged_item::DamagedItem;

/// Rental lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum RentalStatus {
    Pending,
    ToPickup,
    ToReturn,
    Returned,
    Completed,
    Cancelled,
}

impl RentalStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::ToPickup => "to_pickup",
            Self::ToReturn => "to_return",
            Self::Returned => "returned",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Custom tailoring mode
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum TailoringType {
    /// Customer buys the garment outright, no deposit
    Purchase,
    /// Garment is made for the customer and rented back; full price held as deposit
    RentBack,
}

/// Payment method
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    EWallet,
}

/// Rental entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Rental {
    pub id: i64,
    /// Customer-facing code, `RNT-XXXXXXXX`
    pub reference_code: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub customer_address: Option<String>,
    /// YYYY-MM-DD
    pub rental_date: String,
    /// YYYY-MM-DD
    pub return_date: String,
    pub status: RentalStatus,
    pub shop_discount: f64,
    /// Staff override of the computed deposit
    pub deposit_override: Option<f64>,
    /// Stock has been returned to the shelf (or the rental was cancelled)
    pub stock_settled: bool,
    /// Reservation this rental was converted from
    pub reservation_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Single item line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RentalItem {
    pub id: i64,
    pub rental_id: i64,
    pub item_id: i64,
    pub variation_id: i64,
    pub name: String,
    pub color: String,
    pub size: String,
    /// Price snapshot
    pub price: f64,
    pub quantity: i64,
}

/// Package line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RentalPackage {
    pub id: i64,
    pub rental_id: i64,
    pub package_id: i64,
    pub name: String,
    /// Price snapshot
    pub price: f64,
    pub quantity: i64,

    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub fulfillment: Vec<PackageFulfillment>,
}

/// Concrete garment handed out to fulfil a package (e.g. role "groom" → black suit, size 40)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PackageFulfillment {
    pub id: i64,
    pub rental_package_id: i64,
    pub role: String,
    pub item_id: i64,
    pub variation_id: i64,
    pub quantity: i64,
}

/// Custom tailoring line
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RentalCustomItem {
    pub id: i64,
    pub rental_id: i64,
    pub name: String,
    pub tailoring_type: TailoringType,
    pub price: f64,
    pub quantity: i64,
    /// Free-form measurements (chest, waist, inseam…)
    #[cfg_attr(feature = "db", sqlx(json))]
    pub measurements: serde_json::Value,
    pub notes: Option<String>,
}

/// Payment recorded against a rental
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct RentalPayment {
    pub id: i64,
    pub rental_id: i64,
    pub amount: f64,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub paid_at: i64,
}

/// Computed money summary of a rental or quote
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct RentalFinancials {
    pub subtotal: f64,
    pub required_deposit: f64,
    pub deposit_amount: f64,
    pub shop_discount: f64,
    pub grand_total: f64,
    pub total_paid: f64,
    pub remaining_balance: f64,
}

/// Rental with all lines, payments, damage reports and computed totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalDetail {
    #[serde(flatten)]
    pub rental: Rental,
    pub items: Vec<RentalItem>,
    pub packages: Vec<RentalPackage>,
    pub custom_items: Vec<RentalCustomItem>,
    pub payments: Vec<RentalPayment>,
    pub damaged_items: Vec<DamagedItem>,
    pub financials: RentalFinancials,
}

// ==================== Payloads ====================

/// Single item line input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalItemInput {
    pub variation_id: i64,
    pub quantity: i64,
}

/// Garment assignment for a package line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FulfillmentInput {
    pub role: String,
    pub variation_id: i64,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

/// Package line input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalPackageInput {
    pub package_id: i64,
    pub quantity: i64,
    #[serde(default)]
    pub fulfillment: Vec<FulfillmentInput>,
}

/// Custom tailoring line input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalCustomInput {
    pub name: String,
    pub tailoring_type: TailoringType,
    pub price: f64,
    pub quantity: i64,
    #[serde(default)]
    pub measurements: Option<serde_json::Value>,
    pub notes: Option<String>,
}

/// Complete set of lines of a rental (create, or replace on edit)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RentalLines {
    #[serde(default)]
    pub items: Vec<RentalItemInput>,
    #[serde(default)]
    pub packages: Vec<RentalPackageInput>,
    #[serde(default)]
    pub custom_items: Vec<RentalCustomInput>,
}

impl RentalLines {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.packages.is_empty() && self.custom_items.is_empty()
    }
}

/// Create rental payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalCreate {
    pub customer: CustomerInfo,
    pub rental_date: String,
    pub return_date: String,
    pub shop_discount: Option<f64>,
    pub deposit_override: Option<f64>,
    pub notes: Option<String>,
    #[serde(flatten)]
    pub lines: RentalLines,
}

/// Update rental details payload (lines are replaced through [`RentalLines`])
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RentalUpdate {
    pub customer: Option<CustomerInfo>,
    pub rental_date: Option<String>,
    pub return_date: Option<String>,
    pub notes: Option<String>,
    pub shop_discount: Option<f64>,
    pub deposit_override: Option<f64>,
    /// Drop the deposit override and fall back to the computed deposit
    #[serde(default)]
    pub clear_deposit_override: bool,
}

/// Damaged quantity reported on return
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DamageReport {
    pub variation_id: i64,
    pub quantity: i64,
    pub notes: Option<String>,
}

/// Status change payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RentalStatusChange {
    pub status: RentalStatus,
    /// Only meaningful when moving to returned/completed
    #[serde(default)]
    pub damaged: Vec<DamageReport>,
}

/// Record payment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentCreate {
    pub amount: f64,
    pub method: PaymentMethod,
    pub reference: Option<String>,
    pub note: Option<String>,
}

fn default_quantity() -> i64 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&RentalStatus::ToPickup).unwrap(),
            "\"to_pickup\""
        );
        let s: RentalStatus = serde_json::from_str("\"to_return\"").unwrap();
        assert_eq!(s, RentalStatus::ToReturn);
        assert_eq!(RentalStatus::Cancelled.to_string(), "cancelled");
    }

    #[test]
    fn create_payload_accepts_flattened_lines() {
        let json = r#"{
            "customer": {"name": "Ana", "phone": "0917"},
            "rental_date": "2026-05-01",
            "return_date": "2026-05-03",
            "items": [{"variation_id": 7, "quantity": 2}],
            "custom_items": [{"name": "Barong", "tailoring_type": "rent_back", "price": 3500, "quantity": 1}]
        }"#;
        let payload: RentalCreate = serde_json::from_str(json).unwrap();
        assert_eq!(payload.lines.items.len(), 1);
        assert!(payload.lines.packages.is_empty());
        assert_eq!(
            payload.lines.custom_items[0].tailoring_type,
            TailoringType::RentBack
        );
        assert!(!payload.lines.is_empty());
    }

    #[test]
    fn fulfillment_quantity_defaults_to_one() {
        let f: FulfillmentInput =
            serde_json::from_str(r#"{"role": "bride", "variation_id": 3}"#).unwrap();
        assert_eq!(f.quantity, 1);
    }
}
