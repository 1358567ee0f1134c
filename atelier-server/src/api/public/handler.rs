//! Public Storefront API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::ErrorCode;
use shared::models::{
    Appointment, AppointmentCreate, ContentBlock, Item, Package, PublicShopInfo,
    ReservationCreate, ReservationReceipt, SlotAvailability, TrackingResult,
};

use crate::api::content::content_not_found;
use crate::core::ServerState;
use crate::db::repository::{content, item, item::ItemFilter, package, settings};
use crate::services::tracking;
use crate::utils::validation::{
    MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, normalize_customer, validate_customer,
    validate_optional_text,
};
use crate::utils::{AppError, AppResult};
use crate::{appointments, reservations};

#[derive(Debug, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: String,
}

#[derive(Debug, Deserialize)]
pub struct TrackQuery {
    /// Phone or email given when the request was made
    #[serde(default)]
    pub contact: String,
}

// ── Catalog ─────────────────────────────────────────────────────────

/// Active items with their variations; `quantity` is what is on the shelf now
pub async fn list_items(
    State(state): State<ServerState>,
    Query(query): Query<CatalogQuery>,
) -> AppResult<Json<Vec<Item>>> {
    let filter = ItemFilter {
        active_only: true,
        category: query.category.as_deref().filter(|c| !c.trim().is_empty()),
        search: query.search.as_deref().filter(|s| !s.trim().is_empty()),
    };
    Ok(Json(item::find_all(&state.pool, filter).await?))
}

pub async fn get_item(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Item>> {
    item::find_by_id(&state.pool, id)
        .await?
        .filter(|i| i.is_active)
        .map(Json)
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::ItemNotFound, format!("Item {id} not found"))
        })
}

pub async fn list_packages(State(state): State<ServerState>) -> AppResult<Json<Vec<Package>>> {
    Ok(Json(package::find_all(&state.pool, true).await?))
}

pub async fn shop_info(State(state): State<ServerState>) -> AppResult<Json<PublicShopInfo>> {
    let shop = settings::get(&state.pool).await?;
    Ok(Json(shop.into()))
}

pub async fn list_content(State(state): State<ServerState>) -> AppResult<Json<Vec<ContentBlock>>> {
    Ok(Json(content::list(&state.pool, true).await?))
}

/// Unpublished blocks answer the same as missing ones
pub async fn get_content(
    State(state): State<ServerState>,
    Path(key): Path<String>,
) -> AppResult<Json<ContentBlock>> {
    content::get(&state.pool, &key, true)
        .await?
        .map(Json)
        .ok_or_else(|| content_not_found(&key))
}

pub async fn availability(
    State(state): State<ServerState>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<Vec<SlotAvailability>>> {
    Ok(Json(appointments::availability(&state.pool, &query.date).await?))
}

// ── Submissions ─────────────────────────────────────────────────────

pub async fn create_reservation(
    State(state): State<ServerState>,
    Json(mut payload): Json<ReservationCreate>,
) -> AppResult<Json<ReservationReceipt>> {
    validate_customer(&payload.customer)?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    payload.customer = normalize_customer(payload.customer);

    Ok(Json(
        reservations::create(&state.pool, payload, state.today()).await?,
    ))
}

pub async fn create_appointment(
    State(state): State<ServerState>,
    Json(mut payload): Json<AppointmentCreate>,
) -> AppResult<Json<Appointment>> {
    validate_customer(&payload.customer)?;
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    payload.customer = normalize_customer(payload.customer);
    payload.time_slot = payload.time_slot.trim().to_string();

    Ok(Json(
        appointments::create(&state.pool, payload, state.today()).await?,
    ))
}

// ── Tracking ────────────────────────────────────────────────────────

pub async fn track(
    State(state): State<ServerState>,
    Path(reference): Path<String>,
    Query(query): Query<TrackQuery>,
) -> AppResult<Json<TrackingResult>> {
    if reference.len() > MAX_SHORT_TEXT_LEN || query.contact.len() > MAX_SHORT_TEXT_LEN {
        return Err(AppError::validation("reference or contact is too long"));
    }
    Ok(Json(
        tracking::track(&state.pool, &reference, &query.contact).await?,
    ))
}
