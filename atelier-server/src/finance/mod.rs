//! 财务模块 - 押金、折扣、余额计算
//!
//! - [`money`] - Decimal 精度工具
//! - [`calculator`] - 租赁/预约金额计算

pub mod calculator;
pub mod money;

pub use calculator::{DepositPolicy, Line, calculate, quote, validate_payment};

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Financial validation errors
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FinanceError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must be non-negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("{field} exceeds maximum allowed ({max}), got {value}")]
    TooLarge {
        field: &'static str,
        value: f64,
        max: f64,
    },

    #[error("{field} must be between 1 and {max}, got {value}")]
    InvalidQuantity {
        field: &'static str,
        value: i64,
        max: i64,
    },

    #[error("Shop discount {discount} exceeds subtotal {subtotal}")]
    DiscountExceedsSubtotal { discount: f64, subtotal: f64 },

    #[error("Payment amount must be positive")]
    NonPositivePayment,

    #[error("Payment {amount} exceeds remaining balance {remaining}")]
    PaymentExceedsBalance { amount: f64, remaining: f64 },

    #[error("Total paid {paid} would exceed grand total {grand_total}")]
    Overpaid { paid: f64, grand_total: f64 },
}

impl From<FinanceError> for AppError {
    fn from(err: FinanceError) -> Self {
        let message = err.to_string();
        match err {
            FinanceError::NotFinite { field, .. }
            | FinanceError::Negative { field, .. }
            | FinanceError::TooLarge { field, .. }
            | FinanceError::InvalidQuantity { field, .. } => {
                AppError::with_message(ErrorCode::ValidationFailed, message)
                    .with_detail("field", field)
            }
            FinanceError::DiscountExceedsSubtotal { discount, subtotal } => {
                AppError::with_message(ErrorCode::DiscountExceedsSubtotal, message)
                    .with_detail("discount", discount)
                    .with_detail("subtotal", subtotal)
            }
            FinanceError::NonPositivePayment => {
                AppError::with_message(ErrorCode::PaymentInvalidAmount, message)
            }
            FinanceError::PaymentExceedsBalance { remaining, .. } => {
                AppError::with_message(ErrorCode::PaymentExceedsBalance, message)
                    .with_detail("remaining_balance", remaining)
            }
            FinanceError::Overpaid { paid, grand_total } => {
                AppError::with_message(ErrorCode::PaymentExceedsBalance, message)
                    .with_detail("total_paid", paid)
                    .with_detail("grand_total", grand_total)
            }
        }
    }
}
