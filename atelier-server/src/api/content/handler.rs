//! Storefront Content API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::error::ErrorCode;
use shared::models::{ContentBlock, ContentUpsert};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::content;
use crate::utils::types::DeleteResponse;
use crate::utils::validation::{
    MAX_CONTENT_LEN, MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, MAX_URL_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};

pub(crate) fn content_not_found(key: &str) -> AppError {
    AppError::with_message(ErrorCode::ContentNotFound, format!("Content '{key}' not found"))
        .with_detail("key", key)
}

/// Keys are lowercase slugs: `faq`, `hero_banner`, `return-policy`
fn validate_key(key: &str) -> AppResult<()> {
    validate_required_text(key, "key", MAX_SHORT_TEXT_LEN)?;
    let valid = key
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-');
    if !valid {
        return Err(AppError::validation(
            "key may only contain lowercase letters, digits, '_' and '-'",
        )
        .with_detail("field", "key"));
    }
    Ok(())
}

pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<ContentBlock>>> {
    Ok(Json(content::list(&state.pool, false).await?))
}

pub async fn get_by_key(
    State(state): State<ServerState>,
    Path(key): Path<String>,
) -> AppResult<Json<ContentBlock>> {
    content::get(&state.pool, &key, false)
        .await?
        .map(Json)
        .ok_or_else(|| content_not_found(&key))
}

pub async fn upsert(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(key): Path<String>,
    Json(mut payload): Json<ContentUpsert>,
) -> AppResult<Json<ContentBlock>> {
    validate_key(&key)?;
    validate_required_text(&payload.title, "title", MAX_NAME_LEN)?;
    if payload.body.len() > MAX_CONTENT_LEN {
        return Err(AppError::validation(format!(
            "body is too long ({} chars, max {MAX_CONTENT_LEN})",
            payload.body.len()
        ))
        .with_detail("field", "body"));
    }
    validate_optional_text(&payload.image, "image", MAX_URL_LEN)?;
    payload.title = payload.title.trim().to_string();

    let block = content::upsert(&state.pool, &key, payload).await?;
    tracing::info!(key = %key, published = block.is_published, updated_by = user.id, "Content saved");
    Ok(Json(block))
}

pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(key): Path<String>,
) -> AppResult<Json<DeleteResponse>> {
    let deleted = content::delete(&state.pool, &key).await?;
    if deleted {
        tracing::info!(key = %key, deleted_by = user.id, "Content deleted");
    }
    Ok(Json(DeleteResponse { deleted }))
}
