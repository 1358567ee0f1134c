//! Public request tracking

use serde::{Deserialize, Serialize};

use super::appointment::{AppointmentStatus, AppointmentType};
use super::rental::{RentalFinancials, RentalStatus};
use super::reservation::ReservationStatus;

/// Status summary returned by the public tracker, keyed on the reference prefix
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrackingResult {
    Reservation {
        reference_code: String,
        customer_name: String,
        event_date: String,
        status: ReservationStatus,
    },
    Appointment {
        reference_code: String,
        customer_name: String,
        appointment_date: String,
        time_slot: String,
        appointment_type: AppointmentType,
        status: AppointmentStatus,
    },
    Rental {
        reference_code: String,
        customer_name: String,
        rental_date: String,
        return_date: String,
        status: RentalStatus,
        financials: RentalFinancials,
    },
}
