//! `AppError` and the JSON body it renders to

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use thiserror::Error;

/// Error returned by every handler and workflow of the rental back office
///
/// `code` decides the HTTP status; `details` carries machine-readable context
/// such as the offending field or variation id.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    pub code: ErrorCode,
    pub message: String,
    pub details: Option<HashMap<String, Value>>,
}

impl AppError {
    /// Error with the code's default message
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Attach one detail entry (builder style)
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.details
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ── Shorthands ──────────────────────────────────────────────────

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }

    /// Generic 404 for resources without a dedicated code
    pub fn not_found(resource: impl Into<String>) -> Self {
        let resource = resource.into();
        Self::with_message(ErrorCode::NotFound, format!("{resource} not found"))
            .with_detail("resource", resource)
    }

    pub fn not_authenticated() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(ErrorCode::InvalidCredentials)
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::TokenInvalid, msg)
    }

    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    pub fn permission_denied(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::PermissionDenied, msg)
    }

    pub fn rate_limited() -> Self {
        Self::new(ErrorCode::TooManyRequests)
    }

    pub fn insufficient_stock(variation_id: i64, requested: i64) -> Self {
        Self::new(ErrorCode::InsufficientStock)
            .with_detail("variation_id", variation_id)
            .with_detail("requested", requested)
    }

    /// Rental status change outside the transition table
    pub fn invalid_transition(from: &str, to: &str) -> Self {
        Self::with_message(
            ErrorCode::RentalInvalidTransition,
            format!("Cannot change rental status from {from} to {to}"),
        )
        .with_detail("from", from)
        .with_detail("to", to)
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// JSON body of an error response
///
/// Successful responses are the plain resource JSON; only failures are
/// wrapped, so clients branch on the HTTP status and read `code` for detail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<HashMap<String, Value>>,
}

impl From<&AppError> for ErrorBody {
    fn from(err: &AppError) -> Self {
        Self {
            code: err.code.code(),
            message: err.message.clone(),
            details: err.details.clone(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        if self.code.category() == ErrorCategory::System {
            tracing::error!(code = %self.code, message = %self.message, "System error occurred");
        }
        (self.http_status(), axum::Json(ErrorBody::from(&self))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_and_custom_messages() {
        let err = AppError::new(ErrorCode::ReservationNotFound);
        assert_eq!(err.message, "Reservation not found");
        assert!(err.details.is_none());

        let err = AppError::with_message(ErrorCode::RentalNotFound, "Rental RNT-ABCD1234 not found");
        assert_eq!(err.to_string(), "Rental RNT-ABCD1234 not found");
    }

    #[test]
    fn details_accumulate() {
        let err = AppError::validation("quantity must be at least 1")
            .with_detail("field", "quantity")
            .with_detail("min", 1);
        let details = err.details.unwrap();
        assert_eq!(details["field"], "quantity");
        assert_eq!(details["min"], 1);
    }

    #[test]
    fn shorthands_pick_their_codes() {
        assert_eq!(AppError::not_found("Image a.jpg").message, "Image a.jpg not found");
        assert_eq!(AppError::rate_limited().http_status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(AppError::token_expired().http_status(), StatusCode::UNAUTHORIZED);

        let err = AppError::insufficient_stock(42, 3);
        assert_eq!(err.http_status(), StatusCode::CONFLICT);
        assert_eq!(err.details.unwrap()["variation_id"], 42);

        let err = AppError::invalid_transition("completed", "pending");
        assert_eq!(err.code, ErrorCode::RentalInvalidTransition);
        assert_eq!(err.message, "Cannot change rental status from completed to pending");
    }

    #[test]
    fn error_body_shape() {
        let err = AppError::new(ErrorCode::TrackingNotFound).with_detail("reference", "RSV-1");
        let json = serde_json::to_value(ErrorBody::from(&err)).unwrap();
        assert_eq!(json["code"], ErrorCode::TrackingNotFound.code());
        assert_eq!(json["details"]["reference"], "RSV-1");

        let bare = serde_json::to_string(&ErrorBody::from(&AppError::internal("boom"))).unwrap();
        assert!(!bare.contains("details"));
    }
}
