//! 库存模块 - 库存分配与出入库
//!
//! - [`allocation`] - 每个变体占用数量、差异计算
//! - [`ledger`] - 在调用方事务内执行库存增减

pub mod allocation;
pub mod ledger;

pub use allocation::{Allocation, StockDelta, diff};

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Stock ledger errors
#[derive(Debug, Error)]
pub enum StockError {
    #[error("Insufficient stock for variation {variation_id}: requested {requested}, available {available}")]
    Insufficient {
        variation_id: i64,
        requested: i64,
        available: i64,
    },

    #[error("Variation {0} not found")]
    VariationNotFound(i64),

    #[error("Damaged quantity {damaged} exceeds rented quantity {rented} for variation {variation_id}")]
    DamageExceedsRented {
        variation_id: i64,
        damaged: i64,
        rented: i64,
    },

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl From<StockError> for AppError {
    fn from(err: StockError) -> Self {
        let message = err.to_string();
        match err {
            StockError::Insufficient {
                variation_id,
                requested,
                available,
            } => AppError::insufficient_stock(variation_id, requested)
                .with_detail("available", available),
            StockError::VariationNotFound(id) => {
                AppError::with_message(ErrorCode::VariationNotFound, message)
                    .with_detail("variation_id", id)
            }
            StockError::DamageExceedsRented { variation_id, .. } => {
                AppError::with_message(ErrorCode::DamageExceedsRented, message)
                    .with_detail("variation_id", variation_id)
            }
            StockError::Database(_) => AppError::database(message),
        }
    }
}
