//! Damaged Item API Handlers

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use shared::models::{DamageResolve, DamageStatus, DamagedItem};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::rentals::damage;
use crate::utils::AppResult;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};

#[derive(Debug, Deserialize)]
pub struct DamageQuery {
    pub status: Option<DamageStatus>,
}

pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<DamageQuery>,
) -> AppResult<Json<Vec<DamagedItem>>> {
    Ok(Json(damage::list(&state.pool, query.status).await?))
}

/// `repaired` puts the unit back on the shelf, `disposed` writes it off
pub async fn resolve(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<DamageResolve>,
) -> AppResult<Json<DamagedItem>> {
    validate_optional_text(&payload.notes, "notes", MAX_NOTE_LEN)?;
    let resolved = damage::resolve(&state.pool, id, payload).await?;
    tracing::debug!(damaged_item_id = id, resolved_by = user.id, "Damage resolved via API");
    Ok(Json(resolved))
}
