//! Upload Routes
//!
//! 图片上传 (需登录) 与读取 (公开，供 `<img>` 直接引用)

mod handler;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};

use crate::core::ServerState;

pub use handler::{MAX_FILE_SIZE, UploadResponse, store_image};

/// Build upload router
pub fn router() -> Router<ServerState> {
    Router::new()
        // Upload image API - authentication required
        .route(
            "/api/image/upload",
            // multipart framing on top of the file itself
            post(handler::upload).layer(DefaultBodyLimit::max(MAX_FILE_SIZE + 64 * 1024)),
        )
        // Serve uploaded images - public access, delete requires authentication
        .route(
            "/api/image/{filename}",
            get(handler::serve).delete(handler::remove),
        )
}
