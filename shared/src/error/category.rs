//! 错误分类：按错误码区间归类

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Domain an [`ErrorCode`] belongs to, derived from its numeric range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// 0xxx
    General,
    /// 1xxx: login, tokens
    Auth,
    /// 2xxx
    Permission,
    /// 3xxx: items, variations, stock, damaged items
    Inventory,
    /// 4xxx: rental lifecycle
    Rental,
    /// 5xxx: payments and deposits
    Payment,
    /// 6000-6499: reservations, appointments, storefront content, tracking
    Booking,
    /// 6500-6999: image uploads
    Upload,
    /// 8xxx
    Employee,
    /// 9xxx and anything unassigned
    System,
}

impl ErrorCategory {
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Inventory,
            4000..5000 => Self::Rental,
            5000..6000 => Self::Payment,
            6000..6500 => Self::Booking,
            6500..7000 => Self::Upload,
            8000..9000 => Self::Employee,
            _ => Self::System,
        }
    }
}

impl ErrorCode {
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_and_upload_split_the_6xxx_range() {
        assert_eq!(ErrorCode::ReservationNotFound.category(), ErrorCategory::Booking);
        assert_eq!(ErrorCode::AppointmentSlotFull.category(), ErrorCategory::Booking);
        assert_eq!(ErrorCode::TrackingNotFound.category(), ErrorCategory::Booking);
        assert_eq!(ErrorCode::FileTooLarge.category(), ErrorCategory::Upload);
        assert_eq!(ErrorCode::FileStorageFailed.category(), ErrorCategory::Upload);
    }

    #[test]
    fn codes_land_in_their_domain() {
        assert_eq!(ErrorCode::TooManyRequests.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::TokenExpired.category(), ErrorCategory::Auth);
        assert_eq!(ErrorCode::InsufficientStock.category(), ErrorCategory::Inventory);
        assert_eq!(ErrorCode::RentalNotFound.category(), ErrorCategory::Rental);
        assert_eq!(ErrorCode::EmployeeUsernameExists.category(), ErrorCategory::Employee);
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
        // 7xxx is unassigned
        assert_eq!(ErrorCategory::from_code(7001), ErrorCategory::System);
    }

    #[test]
    fn serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ErrorCategory::Upload).unwrap(),
            "\"upload\""
        );
    }
}
