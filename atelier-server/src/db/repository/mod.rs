//! Repository Module
//!
//! Free functions over `&SqlitePool` (simple CRUD) or `&mut SqliteConnection`
//! (anything that must join the caller's transaction).

// Auth
pub mod employee;

// Inventory
pub mod damaged_item;
pub mod item;
pub mod package;

// Rentals & storefront requests
pub mod appointment;
pub mod rental;
pub mod reservation;

// System
pub mod content;
pub mod dashboard;
pub mod settings;

use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => RepoError::NotFound("Row not found".into()),
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            sqlx::Error::Database(db) if db.is_check_violation() => {
                RepoError::Validation(db.message().to_string())
            }
            _ => RepoError::Database(err.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::AlreadyExists, msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// `LIKE` pattern for a free-text search, with wildcards in the input escaped
pub(crate) fn like_pattern(query: &str) -> String {
    let escaped = query
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" ana "), "%ana%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn repo_errors_map_to_app_codes() {
        let e: AppError = RepoError::Duplicate("employee.username".into()).into();
        assert_eq!(e.code, ErrorCode::AlreadyExists);
        let e: AppError = RepoError::NotFound("Item 1".into()).into();
        assert_eq!(e.code, ErrorCode::NotFound);
        let e: AppError = RepoError::Database("disk I/O".into()).into();
        assert_eq!(e.code, ErrorCode::DatabaseError);
    }
}
