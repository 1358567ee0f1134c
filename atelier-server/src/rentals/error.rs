//! Workflow errors shared by rentals, reservations, appointments and damage handling

use shared::error::{AppError, ErrorCode};
use shared::models::{AppointmentStatus, RentalStatus, ReservationStatus};
use thiserror::Error;

use crate::db::repository::RepoError;
use crate::finance::FinanceError;
use crate::inventory::StockError;

#[derive(Debug, Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    Stock(#[from] StockError),

    #[error(transparent)]
    Finance(#[from] FinanceError),

    #[error("Rental not found: {0}")]
    RentalNotFound(i64),

    #[error("Variation not found: {0}")]
    VariationNotFound(i64),

    #[error("Package not found: {0}")]
    PackageNotFound(i64),

    #[error("Item '{name}' is no longer available")]
    ItemInactive { variation_id: i64, name: String },

    #[error("Package '{name}' is no longer available")]
    PackageInactive { package_id: i64, name: String },

    #[error("Cannot change rental status from {from} to {to}")]
    InvalidTransition { from: RentalStatus, to: RentalStatus },

    #[error("Rental is {0} and can no longer be modified")]
    Locked(RentalStatus),

    #[error("Rental has no lines")]
    Empty,

    #[error("Return date {return_date} precedes rental date {rental_date}")]
    InvalidDates {
        rental_date: String,
        return_date: String,
    },

    #[error("Invalid {field}: {value}")]
    InvalidDate { field: &'static str, value: String },

    #[error("{field} {value} is in the past")]
    DateInPast { field: &'static str, value: String },

    #[error("Payment not found: {0}")]
    PaymentNotFound(i64),

    #[error("Damaged item record not found: {0}")]
    DamageNotFound(i64),

    #[error("Damaged item record {0} was already resolved")]
    DamageAlreadyResolved(i64),

    #[error("Reservation not found: {0}")]
    ReservationNotFound(i64),

    #[error("Reservation is {0}")]
    ReservationInvalidStatus(ReservationStatus),

    #[error("Appointment not found: {0}")]
    AppointmentNotFound(i64),

    #[error("Cannot change appointment status from {from} to {to}")]
    AppointmentInvalidStatus {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Time slot {0} is not offered")]
    SlotUnavailable(String),

    #[error("Time slot {slot} on {date} is fully booked")]
    SlotFull { date: String, slot: String },

    #[error("{0}")]
    Validation(String),
}

impl From<sqlx::Error> for WorkflowError {
    fn from(err: sqlx::Error) -> Self {
        WorkflowError::Repo(RepoError::from(err))
    }
}

impl From<WorkflowError> for AppError {
    fn from(err: WorkflowError) -> Self {
        let message = err.to_string();
        match err {
            WorkflowError::Repo(e) => e.into(),
            WorkflowError::Stock(e) => e.into(),
            WorkflowError::Finance(e) => e.into(),
            WorkflowError::RentalNotFound(id) => {
                AppError::with_message(ErrorCode::RentalNotFound, message).with_detail("id", id)
            }
            WorkflowError::VariationNotFound(id) => {
                AppError::with_message(ErrorCode::VariationNotFound, message)
                    .with_detail("variation_id", id)
            }
            WorkflowError::PackageNotFound(id) => {
                AppError::with_message(ErrorCode::PackageNotFound, message)
                    .with_detail("package_id", id)
            }
            WorkflowError::ItemInactive { variation_id, .. } => {
                AppError::with_message(ErrorCode::ItemInactive, message)
                    .with_detail("variation_id", variation_id)
            }
            WorkflowError::PackageInactive { package_id, .. } => {
                AppError::with_message(ErrorCode::PackageInactive, message)
                    .with_detail("package_id", package_id)
            }
            WorkflowError::InvalidTransition { from, to } => {
                AppError::invalid_transition(from.as_str(), to.as_str())
            }
            WorkflowError::Locked(status) => {
                AppError::with_message(ErrorCode::RentalLocked, message)
                    .with_detail("status", status.as_str())
            }
            WorkflowError::Empty => AppError::new(ErrorCode::RentalEmpty),
            WorkflowError::InvalidDates { .. } => {
                AppError::with_message(ErrorCode::RentalInvalidDates, message)
            }
            WorkflowError::InvalidDate { field, .. } => {
                AppError::validation(message).with_detail("field", field)
            }
            WorkflowError::DateInPast { field, .. } => {
                AppError::with_message(ErrorCode::DateInPast, message).with_detail("field", field)
            }
            WorkflowError::PaymentNotFound(id) => {
                AppError::with_message(ErrorCode::PaymentNotFound, message).with_detail("id", id)
            }
            WorkflowError::DamageNotFound(id) => {
                AppError::with_message(ErrorCode::DamagedItemNotFound, message)
                    .with_detail("id", id)
            }
            WorkflowError::DamageAlreadyResolved(id) => {
                AppError::with_message(ErrorCode::DamagedItemAlreadyResolved, message)
                    .with_detail("id", id)
            }
            WorkflowError::ReservationNotFound(id) => {
                AppError::with_message(ErrorCode::ReservationNotFound, message)
                    .with_detail("id", id)
            }
            WorkflowError::ReservationInvalidStatus(status) => {
                AppError::with_message(ErrorCode::ReservationInvalidStatus, message)
                    .with_detail("status", status.as_str())
            }
            WorkflowError::AppointmentNotFound(id) => {
                AppError::with_message(ErrorCode::AppointmentNotFound, message)
                    .with_detail("id", id)
            }
            WorkflowError::AppointmentInvalidStatus { from, to } => {
                AppError::with_message(ErrorCode::AppointmentInvalidStatus, message)
                    .with_detail("from", from.as_str())
                    .with_detail("to", to.as_str())
            }
            WorkflowError::SlotUnavailable(slot) => {
                AppError::with_message(ErrorCode::AppointmentSlotUnavailable, message)
                    .with_detail("time_slot", slot)
            }
            WorkflowError::SlotFull { date, slot } => {
                AppError::with_message(ErrorCode::AppointmentSlotFull, message)
                    .with_detail("date", date)
                    .with_detail("time_slot", slot)
            }
            WorkflowError::Validation(msg) => AppError::validation(msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_to_domain_codes() {
        let e: AppError = WorkflowError::InvalidTransition {
            from: RentalStatus::Completed,
            to: RentalStatus::Pending,
        }
        .into();
        assert_eq!(e.code, ErrorCode::RentalInvalidTransition);

        let e: AppError = WorkflowError::Stock(StockError::Insufficient {
            variation_id: 9,
            requested: 3,
            available: 1,
        })
        .into();
        assert_eq!(e.code, ErrorCode::InsufficientStock);

        let e: AppError = WorkflowError::SlotFull {
            date: "2026-06-01".into(),
            slot: "10:00".into(),
        }
        .into();
        assert_eq!(e.code, ErrorCode::AppointmentSlotFull);
        assert!(e.message.contains("10:00"));
    }

    #[test]
    fn row_not_found_becomes_repo_not_found() {
        let e = WorkflowError::from(sqlx::Error::RowNotFound);
        assert!(matches!(e, WorkflowError::Repo(RepoError::NotFound(_))));
    }
}
