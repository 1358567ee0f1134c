//! Appointment Model (到店预约)

use serde::{Deserialize, Serialize};
use std::fmt;

use super::customer::CustomerInfo;

/// Appointment purpose
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum AppointmentType {
    Measurement,
    Fitting,
    Consultation,
    Pickup,
}

/// Appointment status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::NoShow => "no_show",
        }
    }

    /// Whether `self → next` is an allowed transition
    pub const fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (*self, next),
            (Pending, Confirmed | Cancelled) | (Confirmed, Completed | Cancelled | NoShow)
        )
    }

    /// Counts against slot capacity: everything except a cancellation
    pub const fn holds_slot(&self) -> bool {
        !matches!(self, Self::Cancelled)
    }

    /// Still ahead of the visit, so it can be moved to another slot
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Appointment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Appointment {
    pub id: i64,
    /// `APT-XXXXXXXX`
    pub reference_code: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    /// YYYY-MM-DD
    pub appointment_date: String,
    /// HH:MM, one of the configured slots
    pub time_slot: String,
    pub appointment_type: AppointmentType,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Public create appointment payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentCreate {
    pub customer: CustomerInfo,
    pub appointment_date: String,
    pub time_slot: String,
    pub appointment_type: AppointmentType,
    pub notes: Option<String>,
}

/// Status update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentStatusUpdate {
    pub status: AppointmentStatus,
}

/// Reschedule payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentReschedule {
    pub appointment_date: String,
    pub time_slot: String,
}

/// Remaining capacity of one slot on a given date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SlotAvailability {
    pub time_slot: String,
    pub capacity: i64,
    pub booked: i64,
    pub remaining: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions() {
        use AppointmentStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Completed));
        assert!(!Pending.can_transition_to(NoShow));
        assert!(Confirmed.can_transition_to(NoShow));
        assert!(Confirmed.can_transition_to(Completed));
        assert!(!Completed.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!NoShow.can_transition_to(Confirmed));
    }

    #[test]
    fn only_cancellations_free_a_slot() {
        assert!(AppointmentStatus::Pending.holds_slot());
        assert!(AppointmentStatus::Confirmed.holds_slot());
        assert!(AppointmentStatus::Completed.holds_slot());
        assert!(AppointmentStatus::NoShow.holds_slot());
        assert!(!AppointmentStatus::Cancelled.holds_slot());

        assert!(AppointmentStatus::Confirmed.is_open());
        assert!(!AppointmentStatus::Completed.is_open());
        assert!(!AppointmentStatus::NoShow.is_open());
    }
}
