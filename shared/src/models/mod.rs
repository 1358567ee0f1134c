//! Data models
//!
//! Shared between atelier-server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` snowflake ids, timestamps are Unix millis and calendar
//! dates are `YYYY-MM-DD` strings.

pub mod appointment;
pub mod auth;
pub mod content;
pub mod customer;
pub mod damaged_item;
pub mod dashboard;
pub mod employee;
pub mod item;
pub mod package;
pub mod rental;
pub mod reservation;
pub mod settings;
pub mod tracking;

// Re-exports
pub use appointment::*;
pub use auth::*;
pub use content::*;
pub use customer::*;
pub use damaged_item::*;
pub use dashboard::*;
pub use employee::*;
pub use item::*;
pub use package::*;
pub use rental::*;
pub use reservation::*;
pub use settings::*;
pub use tracking::*;
