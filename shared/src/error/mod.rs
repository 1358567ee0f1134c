//! Unified error system
//!
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Rich error type with codes, messages, and details
//! - [`ErrorBody`]: JSON body written for failed requests
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Inventory errors
//! - 4xxx: Rental errors
//! - 5xxx: Payment errors
//! - 6000-6499: Booking errors
//! - 6500-6999: Upload errors
//! - 8xxx: Employee errors
//! - 9xxx: System errors
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorBody, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::RentalNotFound);
//!
//! let err = AppError::validation("Quantity must be at least 1")
//!     .with_detail("field", "quantity");
//!
//! let body = ErrorBody::from(&err);
//! assert_eq!(body.code, ErrorCode::ValidationFailed.code());
//! assert_eq!(body.details.unwrap()["field"], "quantity");
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, ErrorBody};
