//! Dashboard API Handlers

use axum::{Json, extract::State};
use shared::models::DashboardSummary;

use crate::core::ServerState;
use crate::services::dashboard;
use crate::utils::AppResult;

/// Today's counters and the month's revenue, in shop-local time
pub async fn summary(State(state): State<ServerState>) -> AppResult<Json<DashboardSummary>> {
    let summary = dashboard::summary(&state.pool, state.today(), state.config.timezone).await?;
    Ok(Json(summary))
}
