//! Unified error codes for the Atelier back office
//!
//! Error codes are shared by the server and every client (storefront, admin UI).
//! They are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Inventory errors (items, variations, packages, damaged items)
//! - 4xxx: Rental errors
//! - 5xxx: Payment errors
//! - 6xxx: Booking errors (reservations, appointments, content, tracking)
//! - 65xx: File upload errors
//! - 8xxx: Employee errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,
    /// Value out of range
    ValueOutOfRange = 8,
    /// Too many requests from the same client
    TooManyRequests = 9,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Admin role required
    AdminRequired = 2003,
    /// Cannot modify admin user
    CannotModifyAdmin = 2004,
    /// Cannot delete admin user
    CannotDeleteAdmin = 2005,
    /// At least one active admin must remain
    LastAdminRequired = 2006,

    // ==================== 3xxx: Inventory ====================
    /// Item not found
    ItemNotFound = 3001,
    /// Item variation not found
    VariationNotFound = 3002,
    /// Package not found
    PackageNotFound = 3003,
    /// Not enough stock for the requested quantity
    InsufficientStock = 3004,
    /// Item is not active
    ItemInactive = 3005,
    /// Variation is referenced by an open rental
    VariationInUse = 3006,
    /// Package is not active
    PackageInactive = 3007,
    /// Damaged item record not found
    DamagedItemNotFound = 3101,
    /// Damaged item record was already resolved
    DamagedItemAlreadyResolved = 3102,
    /// Reported damage exceeds rented quantity
    DamageExceedsRented = 3103,

    // ==================== 4xxx: Rental ====================
    /// Rental not found
    RentalNotFound = 4001,
    /// Status transition not allowed
    RentalInvalidTransition = 4002,
    /// Rental lines cannot be changed in the current status
    RentalLocked = 4003,
    /// Rental has no lines
    RentalEmpty = 4004,
    /// Return date precedes rental date
    RentalInvalidDates = 4005,
    /// Shop discount exceeds subtotal
    DiscountExceedsSubtotal = 4006,

    // ==================== 5xxx: Payment ====================
    /// Payment not found
    PaymentNotFound = 5001,
    /// Payment amount is invalid
    PaymentInvalidAmount = 5002,
    /// Payment exceeds remaining balance
    PaymentExceedsBalance = 5003,
    /// Invalid payment method
    PaymentInvalidMethod = 5004,

    // ==================== 6xxx: Booking ====================
    /// Reservation not found
    ReservationNotFound = 6001,
    /// Reservation status does not allow this operation
    ReservationInvalidStatus = 6002,
    /// Appointment not found
    AppointmentNotFound = 6101,
    /// Requested time slot is not offered
    AppointmentSlotUnavailable = 6102,
    /// Requested time slot is fully booked
    AppointmentSlotFull = 6103,
    /// Appointment status does not allow this operation
    AppointmentInvalidStatus = 6104,
    /// Date lies in the past
    DateInPast = 6105,
    /// Content block not found
    ContentNotFound = 6201,
    /// No request matches the reference and contact
    TrackingNotFound = 6301,

    // ==================== 65xx: File Upload ====================
    /// File too large
    FileTooLarge = 6501,
    /// Unsupported file format
    UnsupportedFileFormat = 6502,
    /// Invalid/corrupted image file
    InvalidImageFile = 6503,
    /// No file provided in request
    NoFileProvided = 6504,
    /// Empty file provided
    EmptyFile = 6505,
    /// Image processing failed
    ImageProcessingFailed = 6508,
    /// File storage failed
    FileStorageFailed = 6509,

    // ==================== 8xxx: Employee ====================
    /// Employee not found
    EmployeeNotFound = 8001,
    /// Employee username already exists
    EmployeeUsernameExists = 8002,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9003,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the developer-facing English message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",
            ErrorCode::ValueOutOfRange => "Value is out of range",
            ErrorCode::TooManyRequests => "Too many requests, please retry later",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::AdminRequired => "Administrator role is required",
            ErrorCode::CannotModifyAdmin => "Cannot modify administrator",
            ErrorCode::CannotDeleteAdmin => "Cannot delete administrator",
            ErrorCode::LastAdminRequired => "At least one active administrator is required",

            // Inventory
            ErrorCode::ItemNotFound => "Item not found",
            ErrorCode::VariationNotFound => "Item variation not found",
            ErrorCode::PackageNotFound => "Package not found",
            ErrorCode::InsufficientStock => "Insufficient stock",
            ErrorCode::ItemInactive => "Item is not available",
            ErrorCode::VariationInUse => "Variation is used by an open rental",
            ErrorCode::PackageInactive => "Package is not available",
            ErrorCode::DamagedItemNotFound => "Damaged item record not found",
            ErrorCode::DamagedItemAlreadyResolved => "Damaged item record already resolved",
            ErrorCode::DamageExceedsRented => "Damaged quantity exceeds rented quantity",

            // Rental
            ErrorCode::RentalNotFound => "Rental not found",
            ErrorCode::RentalInvalidTransition => "Rental status transition not allowed",
            ErrorCode::RentalLocked => "Rental can no longer be modified",
            ErrorCode::RentalEmpty => "Rental has no items",
            ErrorCode::RentalInvalidDates => "Return date must not precede rental date",
            ErrorCode::DiscountExceedsSubtotal => "Discount exceeds subtotal",

            // Payment
            ErrorCode::PaymentNotFound => "Payment not found",
            ErrorCode::PaymentInvalidAmount => "Payment amount is invalid",
            ErrorCode::PaymentExceedsBalance => "Payment exceeds remaining balance",
            ErrorCode::PaymentInvalidMethod => "Invalid payment method",

            // Booking
            ErrorCode::ReservationNotFound => "Reservation not found",
            ErrorCode::ReservationInvalidStatus => "Reservation status does not allow this operation",
            ErrorCode::AppointmentNotFound => "Appointment not found",
            ErrorCode::AppointmentSlotUnavailable => "Time slot is not offered",
            ErrorCode::AppointmentSlotFull => "Time slot is fully booked",
            ErrorCode::AppointmentInvalidStatus => "Appointment status does not allow this operation",
            ErrorCode::DateInPast => "Date must not be in the past",
            ErrorCode::ContentNotFound => "Content not found",
            ErrorCode::TrackingNotFound => "No request matches the given reference",

            // File Upload
            ErrorCode::FileTooLarge => "File too large",
            ErrorCode::UnsupportedFileFormat => "Unsupported file format",
            ErrorCode::InvalidImageFile => "Invalid image file",
            ErrorCode::NoFileProvided => "No file provided",
            ErrorCode::EmptyFile => "Empty file provided",
            ErrorCode::ImageProcessingFailed => "Image processing failed",
            ErrorCode::FileStorageFailed => "File storage failed",

            // Employee
            ErrorCode::EmployeeNotFound => "Employee not found",
            ErrorCode::EmployeeUsernameExists => "Username already exists",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error when converting from an invalid u16 to ErrorCode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),
            8 => Ok(ErrorCode::ValueOutOfRange),
            9 => Ok(ErrorCode::TooManyRequests),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2003 => Ok(ErrorCode::AdminRequired),
            2004 => Ok(ErrorCode::CannotModifyAdmin),
            2005 => Ok(ErrorCode::CannotDeleteAdmin),
            2006 => Ok(ErrorCode::LastAdminRequired),

            // Inventory
            3001 => Ok(ErrorCode::ItemNotFound),
            3002 => Ok(ErrorCode::VariationNotFound),
            3003 => Ok(ErrorCode::PackageNotFound),
            3004 => Ok(ErrorCode::InsufficientStock),
            3005 => Ok(ErrorCode::ItemInactive),
            3006 => Ok(ErrorCode::VariationInUse),
            3007 => Ok(ErrorCode::PackageInactive),
            3101 => Ok(ErrorCode::DamagedItemNotFound),
            3102 => Ok(ErrorCode::DamagedItemAlreadyResolved),
            3103 => Ok(ErrorCode::DamageExceedsRented),

            // Rental
            4001 => Ok(ErrorCode::RentalNotFound),
            4002 => Ok(ErrorCode::RentalInvalidTransition),
            4003 => Ok(ErrorCode::RentalLocked),
            4004 => Ok(ErrorCode::RentalEmpty),
            4005 => Ok(ErrorCode::RentalInvalidDates),
            4006 => Ok(ErrorCode::DiscountExceedsSubtotal),

            // Payment
            5001 => Ok(ErrorCode::PaymentNotFound),
            5002 => Ok(ErrorCode::PaymentInvalidAmount),
            5003 => Ok(ErrorCode::PaymentExceedsBalance),
            5004 => Ok(ErrorCode::PaymentInvalidMethod),

            // Booking
            6001 => Ok(ErrorCode::ReservationNotFound),
            6002 => Ok(ErrorCode::ReservationInvalidStatus),
            6101 => Ok(ErrorCode::AppointmentNotFound),
            6102 => Ok(ErrorCode::AppointmentSlotUnavailable),
            6103 => Ok(ErrorCode::AppointmentSlotFull),
            6104 => Ok(ErrorCode::AppointmentInvalidStatus),
            6105 => Ok(ErrorCode::DateInPast),
            6201 => Ok(ErrorCode::ContentNotFound),
            6301 => Ok(ErrorCode::TrackingNotFound),

            // File Upload
            6501 => Ok(ErrorCode::FileTooLarge),
            6502 => Ok(ErrorCode::UnsupportedFileFormat),
            6503 => Ok(ErrorCode::InvalidImageFile),
            6504 => Ok(ErrorCode::NoFileProvided),
            6505 => Ok(ErrorCode::EmptyFile),
            6508 => Ok(ErrorCode::ImageProcessingFailed),
            6509 => Ok(ErrorCode::FileStorageFailed),

            // Employee
            8001 => Ok(ErrorCode::EmployeeNotFound),
            8002 => Ok(ErrorCode::EmployeeUsernameExists),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9003 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::ValidationFailed.code(), 2);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::InsufficientStock.code(), 3004);
        assert_eq!(ErrorCode::DamageExceedsRented.code(), 3103);
        assert_eq!(ErrorCode::RentalInvalidTransition.code(), 4002);
        assert_eq!(ErrorCode::PaymentExceedsBalance.code(), 5003);
        assert_eq!(ErrorCode::AppointmentSlotFull.code(), 6103);
        assert_eq!(ErrorCode::FileTooLarge.code(), 6501);
        assert_eq!(ErrorCode::EmployeeUsernameExists.code(), 8002);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_try_from_roundtrips_every_known_code() {
        let codes = [
            ErrorCode::Success,
            ErrorCode::TooManyRequests,
            ErrorCode::AccountDisabled,
            ErrorCode::LastAdminRequired,
            ErrorCode::PackageInactive,
            ErrorCode::DamagedItemAlreadyResolved,
            ErrorCode::DiscountExceedsSubtotal,
            ErrorCode::PaymentInvalidMethod,
            ErrorCode::TrackingNotFound,
            ErrorCode::FileStorageFailed,
            ErrorCode::ConfigError,
        ];
        for code in codes {
            assert_eq!(ErrorCode::try_from(code.code()), Ok(code));
        }
    }

    #[test]
    fn test_try_from_unknown_value() {
        assert_eq!(ErrorCode::try_from(7777), Err(InvalidErrorCode(7777)));
    }

    #[test]
    fn test_serde_as_number() {
        let json = serde_json::to_string(&ErrorCode::RentalNotFound).unwrap();
        assert_eq!(json, "4001");
        let code: ErrorCode = serde_json::from_str("3004").unwrap();
        assert_eq!(code, ErrorCode::InsufficientStock);
    }
}
