//! Rental API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{
    PaymentCreate, Rental, RentalCreate, RentalDetail, RentalLines, RentalStatus,
    RentalStatusChange, RentalUpdate,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::rental::RentalFilter;
use crate::rentals::workflow;
use crate::utils::types::{Paginated, PaginationParams};
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, normalize_customer, validate_customer,
    validate_optional_text, validate_rental_lines,
};
use crate::utils::AppResult;

#[derive(Debug, Deserialize)]
pub struct RentalQuery {
    pub status: Option<RentalStatus>,
    /// Reference code, customer name or phone
    pub search: Option<String>,
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<RentalQuery>,
    Query(page): Query<PaginationParams>,
) -> AppResult<Json<Paginated<Rental>>> {
    let filter = RentalFilter {
        status: query.status,
        search: query.search.filter(|s| !s.trim().is_empty()),
    };
    let (rentals, total) =
        workflow::list(&state.pool, &filter, page.limit(), page.offset()).await?;
    Ok(Json(Paginated::new(rentals, total, &page)))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<RentalDetail>> {
    Ok(Json(workflow::get(&state.pool, id).await?))
}

/// Walk-in rental: lines are priced from the catalog and stock is taken now
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(mut payload): Json<RentalCreate>,
) -> AppResult<Json<RentalDetail>> {
    validate_customer(&payload.customer)?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    validate_rental_lines(&payload.lines)?;
    payload.customer = normalize_customer(payload.customer);

    let detail = workflow::create(&state.pool, payload).await?;
    tracing::debug!(rental_id = detail.rental.id, created_by = user.id, "Rental created via API");
    Ok(Json(detail))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<RentalUpdate>,
) -> AppResult<Json<RentalDetail>> {
    if let Some(customer) = payload.customer.take() {
        validate_customer(&customer)?;
        payload.customer = Some(normalize_customer(customer));
    }
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    Ok(Json(workflow::update_details(&state.pool, id, payload).await?))
}

pub async fn replace_lines(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<RentalLines>,
) -> AppResult<Json<RentalDetail>> {
    validate_rental_lines(&payload)?;
    Ok(Json(workflow::replace_lines(&state.pool, id, payload).await?))
}

pub async fn change_status(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<RentalStatusChange>,
) -> AppResult<Json<RentalDetail>> {
    for report in &payload.damaged {
        validate_optional_text(&report.notes, "damaged.notes", MAX_NOTE_LEN)?;
    }
    let to = payload.status;
    let detail = workflow::change_status(&state.pool, id, payload).await?;
    tracing::debug!(rental_id = id, status = %to, changed_by = user.id, "Rental status changed via API");
    Ok(Json(detail))
}

pub async fn add_payment(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<PaymentCreate>,
) -> AppResult<Json<RentalDetail>> {
    validate_optional_text(&payload.reference, "reference", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;
    Ok(Json(workflow::add_payment(&state.pool, id, payload).await?))
}

pub async fn remove_payment(
    State(state): State<ServerState>,
    Path((id, payment_id)): Path<(i64, i64)>,
) -> AppResult<Json<RentalDetail>> {
    Ok(Json(workflow::remove_payment(&state.pool, id, payment_id).await?))
}
