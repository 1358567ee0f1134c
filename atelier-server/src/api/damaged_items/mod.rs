//! Damaged Item API Module
//!
//! 归还时登记的损坏件：列表与处理 (修复回库 / 报废)

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::permissions::INVENTORY_MANAGE;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/damaged-items", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}/resolve", post(handler::resolve))
        .layer(middleware::from_fn(require_permission(INVENTORY_MANAGE)))
}
