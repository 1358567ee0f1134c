//! Package API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::error::ErrorCode;
use shared::models::{Package, PackageCreate, PackageUpdate};

use crate::core::ServerState;
use crate::db::repository::{RepoError, package};
use crate::finance::money::{MAX_PRICE, validate_amount};
use crate::utils::types::DeleteResponse;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// Upper bound on listed inclusions per package
const MAX_INCLUSIONS: usize = 50;

#[derive(Debug, Deserialize)]
pub struct PackageQuery {
    #[serde(default)]
    pub active_only: bool,
}

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::PackageNotFound, format!("Package {id} not found"))
        .with_detail("package_id", id)
}

/// Trim entries and drop blanks
fn clean_inclusions(inclusions: Vec<String>) -> AppResult<Vec<String>> {
    let cleaned: Vec<String> = inclusions
        .into_iter()
        .map(|i| i.trim().to_string())
        .filter(|i| !i.is_empty())
        .collect();
    if cleaned.len() > MAX_INCLUSIONS {
        return Err(AppError::validation(format!(
            "A package lists at most {MAX_INCLUSIONS} inclusions"
        ))
        .with_detail("field", "inclusions"));
    }
    for entry in &cleaned {
        validate_required_text(entry, "inclusions", MAX_NAME_LEN)?;
    }
    Ok(cleaned)
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<PackageQuery>,
) -> AppResult<Json<Vec<Package>>> {
    Ok(Json(package::find_all(&state.pool, query.active_only).await?))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Package>> {
    let found = package::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(found))
}

pub async fn create(
    State(state): State<ServerState>,
    Json(mut payload): Json<PackageCreate>,
) -> AppResult<Json<Package>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;
    validate_amount(payload.price, "price", MAX_PRICE)?;
    payload.name = payload.name.trim().to_string();
    payload.inclusions = clean_inclusions(payload.inclusions)?;

    let created = package::create(&state.pool, payload).await?;
    tracing::info!(package_id = created.id, name = %created.name, "Package created");
    Ok(Json(created))
}

pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(mut payload): Json<PackageUpdate>,
) -> AppResult<Json<Package>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;
    if let Some(price) = payload.price {
        validate_amount(price, "price", MAX_PRICE)?;
    }
    payload.name = payload.name.map(|n| n.trim().to_string());
    payload.inclusions = payload.inclusions.map(clean_inclusions).transpose()?;

    let updated = package::update(&state.pool, id, payload)
        .await
        .map_err(|e| match e {
            RepoError::NotFound(_) => not_found(id),
            other => other.into(),
        })?;
    tracing::info!(package_id = id, "Package updated");
    Ok(Json(updated))
}

/// Soft delete
pub async fn deactivate(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<DeleteResponse>> {
    if package::find_by_id(&state.pool, id).await?.is_none() {
        return Err(not_found(id));
    }
    let deleted = package::deactivate(&state.pool, id).await?;
    if deleted {
        tracing::info!(package_id = id, "Package deactivated");
    }
    Ok(Json(DeleteResponse { deleted }))
}
