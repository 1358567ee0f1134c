//! Dashboard API Module

mod handler;

use axum::{Router, middleware, routing::get};

use crate::auth::permissions::DASHBOARD_VIEW;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/dashboard", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/summary", get(handler::summary))
        .layer(middleware::from_fn(require_permission(DASHBOARD_VIEW)))
}
