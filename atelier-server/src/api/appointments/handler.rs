//! Appointment API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    Appointment, AppointmentReschedule, AppointmentStatus, AppointmentStatusUpdate,
    SlotAvailability,
};

use crate::appointments;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct AppointmentQuery {
    /// YYYY-MM-DD
    pub date: Option<String>,
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: String,
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<AppointmentQuery>,
) -> AppResult<Json<Vec<Appointment>>> {
    let date = query.date.as_deref().filter(|d| !d.is_empty());
    Ok(Json(appointments::list(&state.pool, date, query.status).await?))
}

pub async fn availability(
    State(state): State<ServerState>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Vec<SlotAvailability>>> {
    Ok(Json(appointments::availability(&state.pool, &query.date).await?))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Appointment>> {
    Ok(Json(appointments::get(&state.pool, id).await?))
}

pub async fn update_status(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<AppointmentStatusUpdate>,
) -> AppResult<Json<Appointment>> {
    let updated = appointments::update_status(&state.pool, id, payload.status).await?;
    tracing::debug!(appointment_id = id, status = %payload.status, changed_by = user.id, "Appointment status changed via API");
    Ok(Json(updated))
}

pub async fn reschedule(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AppointmentReschedule>,
) -> AppResult<Json<Appointment>> {
    Ok(Json(
        appointments::reschedule(&state.pool, id, payload, state.today()).await?,
    ))
}
