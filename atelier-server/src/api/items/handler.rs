//! Item API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::ErrorCode;
use shared::models::{
    Item, ItemCreate, ItemUpdate, ItemVariation, LowStockVariation, StockAdjustment,
    VariationCreate, VariationUpdate,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{RepoError, item, item::ItemFilter, settings};
use crate::finance::money::{MAX_PRICE, MAX_QUANTITY, validate_amount};
use crate::inventory::ledger;
use crate::utils::types::DeleteResponse;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};

#[derive(Debug, Deserialize)]
pub struct ItemQuery {
    pub category: Option<String>,
    pub search: Option<String>,
    /// Hide deactivated items (default: show everything)
    #[serde(default)]
    pub active_only: bool,
}

fn item_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::ItemNotFound, format!("Item {id} not found"))
        .with_detail("id", id)
}

fn variation_not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::VariationNotFound, format!("Variation {id} not found"))
        .with_detail("variation_id", id)
}

/// Repository NotFound on an item/variation id maps to the specific code
fn or_not_found(err: RepoError, not_found: impl FnOnce() -> AppError) -> AppError {
    match err {
        RepoError::NotFound(_) => not_found(),
        other => other.into(),
    }
}

fn validate_variation(v: &VariationCreate) -> AppResult<()> {
    validate_required_text(&v.color, "color", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&v.size, "size", MAX_SHORT_TEXT_LEN)?;
    if !(0..=MAX_QUANTITY).contains(&v.quantity) {
        return Err(AppError::validation(format!(
            "quantity must be between 0 and {MAX_QUANTITY}"
        ))
        .with_detail("field", "quantity"));
    }
    Ok(())
}

fn validate_create(data: &ItemCreate) -> AppResult<()> {
    validate_required_text(&data.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&data.category, "category", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&data.image, "image", MAX_URL_LEN)?;
    validate_amount(data.price, "price", MAX_PRICE)?;
    data.variations.iter().try_for_each(validate_variation)
}

fn validate_update(data: &ItemUpdate) -> AppResult<()> {
    if let Some(name) = &data.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(category) = &data.category {
        validate_required_text(category, "category", MAX_SHORT_TEXT_LEN)?;
    }
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&data.image, "image", MAX_URL_LEN)?;
    if let Some(price) = data.price {
        validate_amount(price, "price", MAX_PRICE)?;
    }
    Ok(())
}

/// List items with their variations
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ItemQuery>,
) -> AppResult<Json<Vec<Item>>> {
    let filter = ItemFilter {
        active_only: query.active_only,
        category: query.category.as_deref().filter(|c| !c.trim().is_empty()),
        search: query.search.as_deref().filter(|s| !s.trim().is_empty()),
    };
    let items = item::find_all(&state.pool, filter).await?;
    Ok(Json(items))
}

pub async fn categories(State(state): State<ServerState>) -> AppResult<Json<Vec<String>>> {
    Ok(Json(item::categories(&state.pool).await?))
}

/// Variations at or below the configured low-stock threshold
pub async fn low_stock(State(state): State<ServerState>) -> AppResult<Json<Vec<LowStockVariation>>> {
    let shop = settings::get(&state.pool).await?;
    Ok(Json(item::low_stock(&state.pool, shop.low_stock_threshold).await?))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Item>> {
    let found = item::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| item_not_found(id))?;
    Ok(Json(found))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(mut payload): Json<ItemCreate>,
) -> AppResult<Json<Item>> {
    validate_create(&payload)?;
    payload.name = payload.name.trim().to_string();
    payload.category = payload.category.trim().to_string();

    let created = item::create(&state.pool, payload).await?;
    tracing::info!(
        item_id = created.id,
        name = %created.name,
        variations = created.variations.len(),
        "Item created"
    );
    Ok(Json(created))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<ItemUpdate>,
) -> AppResult<Json<Item>> {
    validate_update(&payload)?;
    payload.name = payload.name.map(|n| n.trim().to_string());
    payload.category = payload.category.map(|c| c.trim().to_string());

    let updated = item::update(&state.pool, id, payload)
        .await
        .map_err(|e| or_not_found(e, || item_not_found(id)))?;
    tracing::info!(item_id = id, "Item updated");
    Ok(Json(updated))
}

/// Soft delete: the item disappears from the storefront, history stays intact
pub async fn deactivate(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DeleteResponse>> {
    if item::find_by_id(&state.pool, id).await?.is_none() {
        return Err(item_not_found(id));
    }
    let deleted = item::deactivate(&state.pool, id).await?;
    if deleted {
        tracing::info!(item_id = id, "Item deactivated");
    }
    Ok(Json(DeleteResponse { deleted }))
}

pub async fn add_variation(
    State(state): State<ServerState>,
    Path(item_id): Path<i64>,
    Json(payload): Json<VariationCreate>,
) -> AppResult<Json<ItemVariation>> {
    validate_variation(&payload)?;
    if item::find_by_id(&state.pool, item_id).await?.is_none() {
        return Err(item_not_found(item_id));
    }
    let created = item::add_variation(&state.pool, item_id, payload).await?;
    tracing::info!(
        item_id,
        variation_id = created.id,
        quantity = created.quantity,
        "Variation added"
    );
    Ok(Json(created))
}

pub async fn update_variation(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<VariationUpdate>,
) -> AppResult<Json<ItemVariation>> {
    if let Some(color) = &payload.color {
        validate_required_text(color, "color", MAX_SHORT_TEXT_LEN)?;
    }
    if let Some(size) = &payload.size {
        validate_required_text(size, "size", MAX_SHORT_TEXT_LEN)?;
    }
    let updated = item::update_variation(&state.pool, id, payload)
        .await
        .map_err(|e| or_not_found(e, || variation_not_found(id)))?;
    Ok(Json(updated))
}

/// Hard delete, only for variations no document has ever referenced
pub async fn delete_variation(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DeleteResponse>> {
    if item::variation_in_use(&state.pool, id).await? {
        return Err(AppError::with_message(
            ErrorCode::VariationInUse,
            "Variation is referenced by rentals, reservations or damage records; deactivate the item instead",
        )
        .with_detail("variation_id", id));
    }
    let deleted = item::delete_variation(&state.pool, id).await?;
    if !deleted {
        return Err(variation_not_found(id));
    }
    tracing::info!(variation_id = id, "Variation deleted");
    Ok(Json(DeleteResponse { deleted }))
}

/// Manual stock correction (restock, shrinkage, stocktake)
pub async fn adjust_stock(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<StockAdjustment>,
) -> AppResult<Json<ItemVariation>> {
    if payload.delta == 0 || payload.delta.abs() > MAX_QUANTITY {
        return Err(AppError::validation(format!(
            "delta must be non-zero and at most {MAX_QUANTITY} in magnitude"
        ))
        .with_detail("field", "delta"));
    }
    validate_optional_text(&payload.reason, "reason", MAX_NOTE_LEN)?;

    let mut tx = state.pool.begin().await.map_err(RepoError::from)?;
    let quantity = ledger::adjust(&mut tx, id, payload.delta).await?;
    let variation = item::find_variation(&mut tx, id)
        .await?
        .ok_or_else(|| variation_not_found(id))?;
    tx.commit().await.map_err(RepoError::from)?;

    tracing::info!(
        variation_id = id,
        delta = payload.delta,
        quantity,
        reason = payload.reason.as_deref().unwrap_or(""),
        adjusted_by = user.id,
        "Stock adjusted"
    );
    Ok(Json(variation))
}
