//! Appointment API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::auth::permissions::APPOINTMENTS_MANAGE;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/appointments", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route("/availability", get(handler::availability))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/status", post(handler::update_status))
        .route("/{id}/reschedule", post(handler::reschedule))
        .layer(middleware::from_fn(require_permission(APPOINTMENTS_MANAGE)))
}
