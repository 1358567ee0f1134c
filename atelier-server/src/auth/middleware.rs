//! 认证中间件
//!
//! 为 JWT 认证和授权提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::error::ErrorCode;

use crate::AppError;
use crate::auth::{CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::security_log;

/// Routes reachable without a token
fn is_public_api_route(method: &http::Method, path: &str) -> bool {
    path == "/api/auth/login"
        || path == "/api/health"
        || path.starts_with("/api/public/")
        // 图片直接被 <img> 引用，无法携带 Authorization 头
        || (method == http::Method::GET && path.starts_with("/api/image/"))
}

/// 认证中间件 - 要求员工登录
///
/// 从 `Authorization: Bearer <token>` 头提取并验证 JWT。
/// 验证成功后将 [`CurrentUser`] 注入请求扩展。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径
/// - `/api/auth/login`, `/api/health`
/// - `/api/public/**` (店面接口)
/// - `GET /api/image/{filename}`
///
/// # 错误处理
///
/// | 错误 | HTTP 状态码 |
/// |------|------------|
/// | 无 Authorization 头 | 401 NotAuthenticated |
/// | 令牌过期 | 401 TokenExpired |
/// | 无效令牌 | 401 TokenInvalid |
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    // 允许 CORS 预检的 OPTIONS 请求 (跳过认证)
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // 非 API 路由跳过认证 (让它们正常返回 404)
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    if is_public_api_route(req.method(), path) {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = req.uri().to_string());
            return Err(AppError::not_authenticated());
        }
    };

    let user = state
        .jwt_service
        .validate_token(token)
        .and_then(CurrentUser::try_from);

    match user {
        Ok(user) => {
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = e.to_string(),
                uri = req.uri().to_string()
            );

            match e {
                JwtError::ExpiredToken => Err(AppError::token_expired()),
                _ => Err(AppError::invalid_token("Invalid token")),
            }
        }
    }
}

/// 权限检查中间件 - 要求特定权限
///
/// # 用法
///
/// ```ignore
/// use axum::middleware;
/// Router::new()
///     .route("/api/rentals", get(handler::list))
///     .layer(middleware::from_fn(require_permission("rentals:manage")));
/// ```
///
/// 无权限返回 403 PermissionDenied
pub fn require_permission(
    permission: &'static str,
) -> impl Fn(
    Request,
    Next,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<Response, AppError>> + Send>>
+ Clone {
    move |req: Request, next: Next| {
        Box::pin(async move {
            let user = req.current_user()?;

            if !user.has_permission(permission) {
                security_log!(
                    "WARN",
                    "permission_denied",
                    user_id = user.id,
                    username = user.username.clone(),
                    required_permission = permission
                );
                return Err(AppError::permission_denied(format!(
                    "Permission denied: {}",
                    permission
                )));
            }

            Ok(next.run(req).await)
        })
    }
}

/// 管理员中间件 - 要求管理员角色
///
/// 非管理员返回 403 AdminRequired
pub async fn require_admin(req: Request, next: Next) -> Result<Response, AppError> {
    let user = req.current_user()?;
    if !user.is_admin() {
        security_log!(
            "WARN",
            "admin_required",
            user_id = user.id,
            username = user.username.clone(),
            user_role = user.role.as_str()
        );
        return Err(AppError::new(ErrorCode::AdminRequired));
    }

    Ok(next.run(req).await)
}

/// 从请求中提取 CurrentUser 的扩展方法
pub trait CurrentUserExt {
    /// 未认证返回 401 NotAuthenticated
    fn current_user(&self) -> Result<&CurrentUser, AppError>;
}

impl CurrentUserExt for Request {
    fn current_user(&self) -> Result<&CurrentUser, AppError> {
        self.extensions()
            .get::<CurrentUser>()
            .ok_or_else(AppError::not_authenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_routes() {
        let get = http::Method::GET;
        let post = http::Method::POST;
        assert!(is_public_api_route(&post, "/api/auth/login"));
        assert!(is_public_api_route(&post, "/api/public/reservations"));
        assert!(is_public_api_route(&get, "/api/public/track/RSV-ABCD2345"));
        assert!(is_public_api_route(&get, "/api/image/abc.jpg"));
        assert!(!is_public_api_route(&http::Method::DELETE, "/api/image/abc.jpg"));
        assert!(!is_public_api_route(&get, "/api/auth/me"));
        assert!(!is_public_api_route(&get, "/api/rentals"));
        assert!(!is_public_api_route(&get, "/api/publicity"));
    }
}
