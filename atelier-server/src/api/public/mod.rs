//! Public Storefront API Module
//!
//! 无需登录的店面接口 (`require_auth` 跳过 `/api/public/**`)。
//!
//! | 路径 | 方法 | 限流 |
//! |------|------|------|
//! | /api/public/items, /items/{id}, /packages | GET | - |
//! | /api/public/shop | GET | - |
//! | /api/public/content, /content/{key} | GET | - |
//! | /api/public/appointments/availability?date= | GET | - |
//! | /api/public/reservations | POST | submission |
//! | /api/public/appointments | POST | submission |
//! | /api/public/track/{reference}?contact= | GET | tracking |

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::core::ServerState;
use crate::utils::rate_limit::{submission_rate_limit, tracking_rate_limit};

pub fn router(state: &ServerState) -> Router<ServerState> {
    Router::new().nest("/api/public", routes(state))
}

fn routes(state: &ServerState) -> Router<ServerState> {
    let catalog_routes = Router::new()
        .route("/items", get(handler::list_items))
        .route("/items/{id}", get(handler::get_item))
        .route("/packages", get(handler::list_packages))
        .route("/shop", get(handler::shop_info))
        .route("/content", get(handler::list_content))
        .route("/content/{key}", get(handler::get_content))
        .route("/appointments/availability", get(handler::availability));

    let submission_routes = Router::new()
        .route("/reservations", post(handler::create_reservation))
        .route("/appointments", post(handler::create_appointment))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            submission_rate_limit,
        ));

    let tracking_routes = Router::new()
        .route("/track/{reference}", get(handler::track))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            tracking_rate_limit,
        ));

    catalog_routes
        .merge(submission_routes)
        .merge(tracking_routes)
}
