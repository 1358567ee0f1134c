//! Storefront Content API Module
//!
//! FAQ、关于我们、横幅、政策等按 key 存储的内容块。
//! 公开读取走 `/api/public/content` (仅已发布)。

mod handler;

pub(crate) use handler::content_not_found;

use axum::{Router, middleware, routing::get};

use crate::auth::permissions::CONTENT_MANAGE;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/content", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list))
        .route(
            "/{key}",
            get(handler::get_by_key)
                .put(handler::upsert)
                .delete(handler::delete),
        )
        .layer(middleware::from_fn(require_permission(CONTENT_MANAGE)))
}
