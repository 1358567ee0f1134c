//! Per-IP fixed-window rate limiting for login and the public storefront

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::core::ServerState;
use crate::security_log;
use crate::utils::AppError;

/// A limit of `max_requests` per client IP within each `window`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Policy {
    pub name: &'static str,
    pub max_requests: u32,
    pub window: Duration,
}

/// Staff login attempts
pub const LOGIN: Policy = Policy {
    name: "login",
    max_requests: 5,
    window: Duration::from_secs(60),
};

/// Storefront reservation and appointment submissions
pub const SUBMISSION: Policy = Policy {
    name: "submission",
    max_requests: 10,
    window: Duration::from_secs(600),
};

/// Storefront request tracking lookups
pub const TRACKING: Policy = Policy {
    name: "tracking",
    max_requests: 30,
    window: Duration::from_secs(60),
};

#[derive(Debug)]
struct Window {
    started: Instant,
    hits: u32,
}

/// Hit counters keyed by policy and client IP
#[derive(Clone, Default)]
pub struct RateLimiter {
    windows: Arc<Mutex<HashMap<(Policy, String), Window>>>,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter").finish_non_exhaustive()
    }
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one hit; `false` once the client is over the policy's limit
    pub async fn allow(&self, policy: Policy, ip: &str) -> bool {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let window = windows
            .entry((policy, ip.to_owned()))
            .or_insert(Window { started: now, hits: 0 });

        if now.duration_since(window.started) >= policy.window {
            *window = Window { started: now, hits: 0 };
        }
        window.hits += 1;
        window.hits <= policy.max_requests
    }

    /// Drop windows that have run out; returns how many were removed
    pub async fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut windows = self.windows.lock().await;
        let before = windows.len();
        windows.retain(|(policy, _), w| now.duration_since(w.started) < policy.window);
        before - windows.len()
    }
}

/// Client address used as the limiter key
///
/// The first `X-Forwarded-For` entry is only honoured when `trust_proxy` is
/// set; a directly exposed server keys on the TCP peer so clients cannot pick
/// their own key.
fn client_ip(request: &Request, trust_proxy: bool) -> String {
    let forwarded = trust_proxy
        .then(|| request.headers().get("x-forwarded-for"))
        .flatten()
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    match forwarded {
        Some(ip) => ip.to_owned(),
        None => request
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ci| ci.0.ip().to_string())
            .unwrap_or_else(|| "unknown".to_owned()),
    }
}

async fn enforce(
    state: &ServerState,
    policy: Policy,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let ip = client_ip(&request, state.config.trust_proxy);
    if !state.rate_limiter.allow(policy, &ip).await {
        security_log!("WARN", "rate_limited", route = policy.name, ip = ip);
        return Err(AppError::rate_limited()
            .with_detail("retry_after_secs", policy.window.as_secs()));
    }
    Ok(next.run(request).await)
}

pub async fn login_rate_limit(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(&state, LOGIN, request, next).await
}

pub async fn submission_rate_limit(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(&state, SUBMISSION, request, next).await
}

pub async fn tracking_rate_limit(
    State(state): State<ServerState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    enforce(&state, TRACKING, request, next).await
}
