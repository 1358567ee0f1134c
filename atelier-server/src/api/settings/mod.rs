//! Shop Settings API Module
//!
//! 所有登录员工可读；修改需要 `settings:manage` (默认仅管理员)。

mod handler;

use axum::{
    Router, middleware,
    routing::{get, put},
};

use crate::auth::permissions::SETTINGS_MANAGE;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/settings", routes())
}

fn routes() -> Router<ServerState> {
    let read_routes = Router::new().route("/", get(handler::get));

    let manage_routes = Router::new()
        .route("/", put(handler::update))
        .layer(middleware::from_fn(require_permission(SETTINGS_MANAGE)));

    read_routes.merge(manage_routes)
}
