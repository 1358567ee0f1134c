//! Reservation API Module
//!
//! 店面提交的预约单在后台的处理：确认、取消、转为租赁单。
//! 提交入口在 `/api/public/reservations`。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::permissions::RESERVATIONS_MANAGE;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/reservations", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/confirm", post(handler::confirm))
        .route("/{id}/cancel", post(handler::cancel))
        .route("/{id}/convert", post(handler::convert))
        .layer(middleware::from_fn(require_permission(RESERVATIONS_MANAGE)))
}
