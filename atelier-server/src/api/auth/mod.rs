//! Authentication API Module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::core::ServerState;
use crate::utils::rate_limit::login_rate_limit;

/// 认证路由
///
/// - `POST /api/auth/login` - 公共路由，按 IP 限流
/// - `GET /api/auth/me` - 需要登录
pub fn router(state: &ServerState) -> Router<ServerState> {
    let login = Router::new()
        .route("/login", post(handler::login))
        .layer(middleware::from_fn_with_state(state.clone(), login_rate_limit));

    let session = Router::new().route("/me", get(handler::me));

    Router::new().nest("/api/auth", login.merge(session))
}
