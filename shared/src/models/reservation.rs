//! Reservation Model (预约订单)
//!
//! Customer-submitted request from the storefront. Reservations do not hold
//! stock; staff convert them into a rental, which is when stock leaves the shelf.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::customer::CustomerInfo;
use super::rental::{FulfillmentInput, RentalCustomInput, RentalFinancials, RentalItemInput};

/// Reservation status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    Cancelled,
    /// Turned into a rental
    Converted,
}

impl ReservationStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Converted => "converted",
        }
    }

    /// Still waiting on staff action (can be confirmed, cancelled or converted)
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reservation entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reservation {
    pub id: i64,
    /// `RSV-XXXXXXXX`
    pub reference_code: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub customer_address: Option<String>,
    /// YYYY-MM-DD
    pub event_date: String,
    pub status: ReservationStatus,
    pub notes: Option<String>,
    pub rental_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Requested single item
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReservationItem {
    pub id: i64,
    pub reservation_id: i64,
    pub item_id: i64,
    pub variation_id: i64,
    pub name: String,
    pub color: String,
    pub size: String,
    pub price: f64,
    pub quantity: i64,
}

/// Requested package
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct ReservationPackage {
    pub id: i64,
    pub reservation_id: i64,
    pub package_id: i64,
    pub name: String,
    pub price: f64,
    pub quantity: i64,
}

/// Reservation with lines and estimated totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationDetail {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub items: Vec<ReservationItem>,
    pub packages: Vec<ReservationPackage>,
    pub quote: RentalFinancials,
}

// ==================== Payloads ====================

/// Requested package input
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationPackageInput {
    pub package_id: i64,
    pub quantity: i64,
}

/// Public create reservation payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationCreate {
    pub customer: CustomerInfo,
    pub event_date: String,
    pub notes: Option<String>,
    #[serde(default)]
    pub items: Vec<RentalItemInput>,
    #[serde(default)]
    pub packages: Vec<ReservationPackageInput>,
}

/// Public receipt returned after submitting a reservation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationReceipt {
    pub reference_code: String,
    pub status: ReservationStatus,
    pub quote: RentalFinancials,
}

/// Garments assigned to one reserved package during conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageAssignment {
    pub package_id: i64,
    #[serde(default)]
    pub fulfillment: Vec<FulfillmentInput>,
}

/// Convert reservation into rental payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationConvert {
    pub rental_date: String,
    pub return_date: String,
    #[serde(default)]
    pub package_assignments: Vec<PackageAssignment>,
    #[serde(default)]
    pub custom_items: Vec<RentalCustomInput>,
    pub shop_discount: Option<f64>,
    pub deposit_override: Option<f64>,
    pub notes: Option<String>,
}
