//! Employee API Handlers

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use shared::error::ErrorCode;
use shared::models::{Employee, EmployeeCreate, EmployeeRole, EmployeeUpdate};

use crate::auth::CurrentUser;
use crate::auth::password::hash_password;
use crate::core::ServerState;
use crate::db::repository::{RepoError, employee};
use crate::utils::types::DeleteResponse;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text, validate_password,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};

fn not_found(id: i64) -> AppError {
    AppError::with_message(ErrorCode::EmployeeNotFound, format!("Employee {id} not found"))
        .with_detail("id", id)
}

fn hash(password: &str) -> AppResult<String> {
    hash_password(password).map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

/// List all employees
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Employee>>> {
    let employees = employee::find_all(&state.pool).await?;
    Ok(Json(employees))
}

/// Get employee by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Employee>> {
    let employee = employee::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| not_found(id))?;
    Ok(Json(employee))
}

/// Create a new employee
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Json(payload): Json<EmployeeCreate>,
) -> AppResult<Json<Employee>> {
    let username = payload.username.trim();
    validate_required_text(username, "username", MAX_SHORT_TEXT_LEN)?;
    if username.chars().any(char::is_whitespace) {
        return Err(AppError::validation("username must not contain spaces")
            .with_detail("field", "username"));
    }
    validate_password(&payload.password)?;
    validate_optional_text(&payload.display_name, "display_name", MAX_NAME_LEN)?;

    let display_name = payload
        .display_name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .unwrap_or(username);

    let created = employee::create(
        &state.pool,
        username,
        display_name,
        &hash(&payload.password)?,
        payload.role,
    )
    .await
    .map_err(|e| match e {
        RepoError::Duplicate(msg) => AppError::with_message(ErrorCode::EmployeeUsernameExists, msg),
        other => other.into(),
    })?;

    tracing::info!(
        employee_id = created.id,
        username = %created.username,
        role = %created.role,
        created_by = user.id,
        "Employee created"
    );
    Ok(Json(created))
}

/// Update an employee
pub async fn update(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<EmployeeUpdate>,
) -> AppResult<Json<Employee>> {
    if let Some(name) = &payload.display_name {
        validate_required_text(name, "display_name", MAX_NAME_LEN)?;
    }
    if let Some(password) = &payload.password {
        validate_password(password)?;
    }

    let deactivating = payload.is_active == Some(false);
    let demoting = payload.role == Some(EmployeeRole::Staff);
    let removes_admin = deactivating || demoting;
    if removes_admin && id == user.id {
        return Err(AppError::with_message(
            ErrorCode::CannotModifyAdmin,
            "You cannot deactivate or demote your own account",
        ));
    }

    // 最后一个在职管理员的检查与写入在同一条语句内完成
    let hash_pass = payload.password.as_deref().map(hash).transpose()?;
    let updated = employee::update(
        &state.pool,
        id,
        payload.display_name.as_deref().map(str::trim),
        hash_pass.as_deref(),
        payload.role,
        payload.is_active,
        removes_admin,
    )
    .await
    .map_err(|e| match e {
        RepoError::NotFound(_) => not_found(id),
        other => other.into(),
    })?
    .ok_or_else(|| AppError::new(ErrorCode::LastAdminRequired))?;

    tracing::info!(
        employee_id = id,
        updated_by = user.id,
        password_changed = hash_pass.is_some(),
        "Employee updated"
    );
    Ok(Json(updated))
}

/// Delete an employee
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<DeleteResponse>> {
    if id == user.id {
        return Err(AppError::with_message(
            ErrorCode::CannotDeleteAdmin,
            "You cannot delete your own account",
        ));
    }
    let deleted = employee::delete(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::LastAdminRequired))?;
    if !deleted {
        return Err(not_found(id));
    }
    tracing::info!(employee_id = id, deleted_by = user.id, "Employee deleted");
    Ok(Json(DeleteResponse { deleted }))
}
