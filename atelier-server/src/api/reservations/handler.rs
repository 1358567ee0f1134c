//! Reservation API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    RentalDetail, Reservation, ReservationConvert, ReservationDetail, ReservationStatus,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::reservations;
use crate::utils::AppResult;
use crate::utils::types::{Paginated, PaginationParams};
use crate::utils::validation::{MAX_NOTE_LEN, validate_line_text, validate_optional_text};

#[derive(Debug, Deserialize)]
pub struct ReservationQuery {
    pub status: Option<ReservationStatus>,
    /// Reference code, customer name or phone
    pub search: Option<String>,
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ReservationQuery>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<Paginated<Reservation>>> {
    let search = query.search.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let (rows, total) =
        reservations::list(&state.pool, query.status, search, page.limit(), page.offset())
            .await?;
    Ok(Json(Paginated::new(rows, total, &page)))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<ReservationDetail>> {
    Ok(Json(reservations::get(&state.pool, id).await?))
}

pub async fn confirm(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ReservationDetail>> {
    let detail = reservations::confirm(&state.pool, id).await?;
    tracing::debug!(reservation_id = id, confirmed_by = user.id, "Reservation confirmed via API");
    Ok(Json(detail))
}

pub async fn cancel(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<ReservationDetail>> {
    let detail = reservations::cancel(&state.pool, id).await?;
    tracing::debug!(reservation_id = id, cancelled_by = user.id, "Reservation cancelled via API");
    Ok(Json(detail))
}

/// Stock is taken here, not when the customer submitted the request
pub async fn convert(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ReservationConvert>,
) -> AppResult<Json<RentalDetail>> {
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    validate_line_text(
        payload.package_assignments.iter().flat_map(|a| &a.fulfillment),
        &payload.custom_items,
    )?;

    let detail = reservations::convert(&state.pool, id, payload).await?;
    tracing::info!(
        reservation_id = id,
        rental_id = detail.rental.id,
        converted_by = user.id,
        "Reservation converted via API"
    );
    Ok(Json(detail))
}
