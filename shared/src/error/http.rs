//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::ItemNotFound
            | Self::VariationNotFound
            | Self::PackageNotFound
            | Self::DamagedItemNotFound
            | Self::RentalNotFound
            | Self::PaymentNotFound
            | Self::ReservationNotFound
            | Self::AppointmentNotFound
            | Self::ContentNotFound
            | Self::TrackingNotFound
            | Self::EmployeeNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::InsufficientStock
            | Self::VariationInUse
            | Self::DamagedItemAlreadyResolved
            | Self::RentalInvalidTransition
            | Self::RentalLocked
            | Self::ReservationInvalidStatus
            | Self::AppointmentSlotFull
            | Self::AppointmentInvalidStatus
            | Self::EmployeeUsernameExists
            | Self::LastAdminRequired => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::AccountDisabled => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::AdminRequired
            | Self::CannotModifyAdmin
            | Self::CannotDeleteAdmin => StatusCode::FORBIDDEN,

            // 413 Payload Too Large
            Self::FileTooLarge => StatusCode::PAYLOAD_TOO_LARGE,

            // 429 Too Many Requests
            Self::TooManyRequests => StatusCode::TOO_MANY_REQUESTS,

            // 500 Internal Server Error
            Self::InternalError
            | Self::DatabaseError
            | Self::ConfigError
            | Self::ImageProcessingFailed
            | Self::FileStorageFailed => StatusCode::INTERNAL_SERVER_ERROR,

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_status() {
        assert_eq!(ErrorCode::RentalNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::TrackingNotFound.http_status(), StatusCode::NOT_FOUND);
        assert_eq!(ErrorCode::VariationNotFound.http_status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_status() {
        assert_eq!(ErrorCode::InsufficientStock.http_status(), StatusCode::CONFLICT);
        assert_eq!(
            ErrorCode::RentalInvalidTransition.http_status(),
            StatusCode::CONFLICT
        );
        assert_eq!(ErrorCode::AppointmentSlotFull.http_status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_auth_statuses() {
        assert_eq!(
            ErrorCode::NotAuthenticated.http_status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(ErrorCode::TokenExpired.http_status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ErrorCode::PermissionDenied.http_status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_bad_request_default() {
        assert_eq!(ErrorCode::ValidationFailed.http_status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ErrorCode::PaymentExceedsBalance.http_status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ErrorCode::DateInPast.http_status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_special_statuses() {
        assert_eq!(
            ErrorCode::TooManyRequests.http_status(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            ErrorCode::FileTooLarge.http_status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(
            ErrorCode::DatabaseError.http_status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
