//! Dashboard Model

use serde::{Deserialize, Serialize};

/// Rental due back soon
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct UpcomingReturn {
    pub rental_id: i64,
    pub reference_code: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub return_date: String,
}

/// Back-office overview counters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Business date the counters were computed for (YYYY-MM-DD)
    pub today: String,
    pub pending_reservations: i64,
    pub pending_appointments: i64,
    pub appointments_today: i64,
    /// to_pickup + to_return
    pub active_rentals: i64,
    /// to_return with return_date before today
    pub overdue_rentals: i64,
    pub damaged_awaiting_repair: i64,
    pub low_stock_variations: i64,
    /// Σ payments received in the current calendar month
    pub revenue_this_month: f64,
    /// Returns due within the next 7 days
    pub upcoming_returns: Vec<UpcomingReturn>,
}
