//! Rental API Module
//!
//! 租赁单全部操作都需要 `rentals:manage` 权限。
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/rentals | GET, POST | 分页列表 (状态/关键字)、新建并扣减库存 |
//! | /api/rentals/{id} | GET, PUT | 详情 (含金额汇总)、修改客户/日期/折扣/押金 |
//! | /api/rentals/{id}/lines | PUT | 整体替换明细，按差异调整库存 |
//! | /api/rentals/{id}/status | POST | 状态流转 (归还时登记损坏) |
//! | /api/rentals/{id}/payments | POST | 登记付款 |
//! | /api/rentals/{id}/payments/{payment_id} | DELETE | 删除误录付款 |

mod handler;

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};

use crate::auth::permissions::RENTALS_MANAGE;
use crate::auth::require_permission;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/rentals", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", get(handler::list).post(handler::create))
        .route("/{id}", get(handler::get_by_id).put(handler::update))
        .route("/{id}/lines", put(handler::replace_lines))
        .route("/{id}/status", post(handler::change_status))
        .route("/{id}/payments", post(handler::add_payment))
        .route(
            "/{id}/payments/{payment_id}",
            delete(handler::remove_payment),
        )
        .layer(middleware::from_fn(require_permission(RENTALS_MANAGE)))
}
