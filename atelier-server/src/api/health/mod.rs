//! 健康检查路由
//!
//! | 路径 | 方法 | 说明 | 认证 |
//! |------|------|------|------|
//! | /api/health | GET | 数据库探测、运行时间、业务日期 | 无 |
//!
//! ```json
//! {
//!   "status": "ok",
//!   "version": "0.1.0",
//!   "uptime_seconds": 42,
//!   "business_date": "2026-10-17",
//!   "timezone": "Asia/Manila",
//!   "database": { "status": "ok", "latency_ms": 1 }
//! }
//! ```

use axum::{Json, Router, extract::State, http::StatusCode, routing::get};
use chrono::NaiveDate;
use serde::Serialize;
use std::time::Instant;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/health", get(health))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// ok | degraded
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    /// 过期清理与预约校验所用的"今天"
    business_date: NaiveDate,
    timezone: String,
    database: DatabaseCheck,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum DatabaseCheck {
    Ok { latency_ms: u64 },
    Error { message: String },
}

async fn probe_database(state: &ServerState) -> DatabaseCheck {
    let started = Instant::now();
    match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.pool)
        .await
    {
        Ok(_) => DatabaseCheck::Ok {
            latency_ms: started.elapsed().as_millis() as u64,
        },
        Err(e) => {
            tracing::error!(error = %e, "Health check database probe failed");
            DatabaseCheck::Error {
                message: e.to_string(),
            }
        }
    }
}

/// 数据库不可用时返回 503
async fn health(State(state): State<ServerState>) -> (StatusCode, Json<HealthResponse>) {
    let database = probe_database(&state).await;
    let healthy = matches!(database, DatabaseCheck::Ok { .. });

    let body = HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        business_date: state.today(),
        timezone: state.config.timezone.name().to_string(),
        database,
    };
    let code = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (code, Json(body))
}
