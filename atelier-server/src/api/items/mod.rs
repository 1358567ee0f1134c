//! Item & Variation API Module
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/items | GET, POST | 列表 (可按分类/关键字过滤)、新建 |
//! | /api/items/categories | GET | 在售分类 |
//! | /api/items/low-stock | GET | 低库存款式 |
//! | /api/items/{id} | GET, PUT, DELETE | 详情、修改、下架 |
//! | /api/items/{id}/variations | POST | 新增颜色/尺码 |
//! | /api/items/variations/{id} | PUT, DELETE | 修改、删除款式 |
//! | /api/items/variations/{id}/stock | POST | 手动库存调整 |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::permissions::INVENTORY_MANAGE;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/items", routes())
}

fn routes() -> Router<ServerState> {
    // 读取路由：登录即可
    let read_routes = Router::new()
        .route("/", get(handler::list))
        .route("/categories", get(handler::categories))
        .route("/low-stock", get(handler::low_stock))
        .route("/{id}", get(handler::get_by_id));

    let manage_routes = Router::new()
        .route("/", post(handler::create))
        .route("/{id}", put(handler::update).delete(handler::deactivate))
        .route("/{id}/variations", post(handler::add_variation))
        .route(
            "/variations/{id}",
            put(handler::update_variation).delete(handler::delete_variation),
        )
        .route("/variations/{id}/stock", post(handler::adjust_stock))
        .layer(middleware::from_fn(require_permission(INVENTORY_MANAGE)));

    read_routes.merge(manage_routes)
}
