//! Server Implementation
//!
//! HTTP 服务器启动和管理

use std::net::SocketAddr;
use std::time::Duration;

use axum::{Router, middleware};
use http::{HeaderName, HeaderValue, StatusCode};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_auth;
use crate::core::{BackgroundTasks, Config, ServerState};
use crate::services::sweep;

const REQUEST_ID_HEADER: &str = "x-request-id";
/// 限流表清理间隔
const RATE_LIMIT_CLEANUP_SECS: u64 = 300;
/// 滚动日志保留天数
const LOG_RETENTION_DAYS: u64 = 30;

/// HTTP 请求日志中间件
async fn log_request(
    request: http::Request<axum::body::Body>,
    next: middleware::Next,
) -> http::Response<axum::body::Body> {
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let status = response.status();

    tracing::info!(target: "http_access", "{} {} {}", method, uri, status);

    response
}

/// Build the Axum router (state not yet attached)
///
/// `state` is only needed by the routers that carry rate limiting
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    Router::<ServerState>::new()
        // Core APIs
        .merge(crate::api::health::router())
        .merge(crate::api::auth::router(state))
        .merge(crate::api::employees::router())
        .merge(crate::api::upload::router())
        // Catalog
        .merge(crate::api::items::router())
        .merge(crate::api::packages::router())
        // Operations
        .merge(crate::api::rentals::router())
        .merge(crate::api::damaged_items::router())
        .merge(crate::api::reservations::router())
        .merge(crate::api::appointments::router())
        .merge(crate::api::dashboard::router())
        // Shop configuration
        .merge(crate::api::settings::router())
        .merge(crate::api::content::router())
        // Storefront
        .merge(crate::api::public::router(state))
}

fn cors_layer(config: &Config) -> CorsLayer {
    match config
        .cors_allow_origin
        .as_deref()
        .and_then(|o| HeaderValue::from_str(o).ok())
    {
        Some(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_methods(Any)
            .allow_headers(Any),
        None => CorsLayer::permissive(),
    }
}

/// Build a fully configured application with all middleware and state
///
/// 服务器与集成测试 (`oneshot`) 共用
pub fn build_app(state: ServerState) -> Router {
    let cors = cors_layer(&state.config);
    let timeout = Duration::from_millis(state.config.request_timeout_ms);

    build_router(&state)
        // JWT 认证中间件 - require_auth 内部会跳过公共路由
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            MakeRequestUuid,
        ))
        // Tower HTTP 中间件
        .layer(cors)
        .layer(CompressionLayer::new())
        // HTTP 请求日志中间件 - 最外层
        .layer(middleware::from_fn(log_request))
}

/// HTTP Server
pub struct Server {
    config: Config,
    state: Option<ServerState>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: None,
        }
    }

    /// Create server with existing state
    pub fn with_state(config: Config, state: ServerState) -> Self {
        Self {
            config,
            state: Some(state),
        }
    }

    pub async fn run(self) -> anyhow::Result<()> {
        let state = match self.state {
            Some(s) => s,
            None => ServerState::initialize(&self.config).await?,
        };

        let tasks = start_background_tasks(&state);

        let addr = SocketAddr::from(([0, 0, 0, 0], self.config.http_port));
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("🚀 Atelier server listening on {}", addr);

        let app = build_app(state);
        let shutdown = async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down...");
        };

        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown)
        .await?;

        tasks.shutdown().await;
        Ok(())
    }
}

/// 启动定时任务：过期记录清理、限流表清理、旧日志清理
fn start_background_tasks(state: &ServerState) -> BackgroundTasks {
    let mut tasks = BackgroundTasks::new();

    let sweep_state = state.clone();
    tasks.spawn_periodic(
        "expiry_sweep",
        Duration::from_secs(state.config.sweep_interval_secs),
        move || {
            let state = sweep_state.clone();
            async move {
                if let Err(e) = sweep::run_once(&state.pool, state.today()).await {
                    tracing::error!(error = %e, "Expiry sweep failed");
                }
            }
        },
    );

    let limiter = state.rate_limiter.clone();
    tasks.spawn_periodic(
        "rate_limit_cleanup",
        Duration::from_secs(RATE_LIMIT_CLEANUP_SECS),
        move || {
            let limiter = limiter.clone();
            async move {
                let removed = limiter.cleanup().await;
                if removed > 0 {
                    tracing::debug!(removed, "Expired rate limit windows dropped");
                }
            }
        },
    );

    let log_dir = state.config.log_dir.clone();
    tasks.spawn_periodic(
        "log_cleanup",
        Duration::from_secs(24 * 60 * 60),
        move || {
            let log_dir = log_dir.clone();
            async move {
                match crate::utils::logger::cleanup_old_logs(&log_dir, LOG_RETENTION_DAYS) {
                    Ok(0) => {}
                    Ok(removed) => tracing::info!(removed, "Removed old log files"),
                    Err(e) => tracing::warn!(error = %e, "Log cleanup failed"),
                }
            }
        },
    );

    tasks.log_summary();
    tasks
}
