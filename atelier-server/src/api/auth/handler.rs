//! Authentication Handlers
//!
//! Handles login and current-user lookup

use std::time::Duration;

use axum::{Extension, Json, extract::State};
use shared::error::ErrorCode;
use shared::models::{Employee, LoginRequest, LoginResponse, UserInfo};

use crate::AppError;
use crate::auth::CurrentUser;
use crate::auth::password::verify_password;
use crate::auth::permissions::get_default_permissions;
use crate::core::ServerState;
use crate::db::repository::employee;
use crate::security_log;

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

fn user_info(e: &Employee) -> UserInfo {
    UserInfo {
        id: e.id,
        username: e.username.clone(),
        display_name: e.display_name.clone(),
        role: e.role,
        permissions: get_default_permissions(e.role),
    }
}

/// Login handler
///
/// Authenticates user credentials and returns a JWT token
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let username = req.username.trim().to_string();
    let found = employee::find_by_username(&state.pool, &username).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent username enumeration
    let employee = match found {
        Some(e) => {
            let password_valid = verify_password(&req.password, &e.hash_pass)
                .map_err(|err| AppError::internal(format!("Password verification failed: {err}")))?;

            if !password_valid {
                security_log!("WARN", "login_failed", username = username.clone(), reason = "invalid_credentials");
                tracing::warn!(username = %username, "Login failed - invalid credentials");
                return Err(AppError::invalid_credentials());
            }

            // Only reveal the disabled state once the password is proven
            if !e.is_active {
                security_log!("WARN", "login_failed", username = username.clone(), reason = "account_disabled");
                return Err(AppError::new(ErrorCode::AccountDisabled));
            }

            e
        }
        None => {
            security_log!("WARN", "login_failed", username = username.clone(), reason = "user_not_found");
            tracing::warn!(username = %username, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let user = user_info(&employee);
    let token = state
        .jwt_service
        .generate_token(user.id, &user.username, user.role, &user.permissions)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    tracing::info!(
        user_id = user.id,
        username = %user.username,
        role = %user.role,
        "User logged in successfully"
    );

    Ok(Json(LoginResponse {
        token,
        expires_in: state.jwt_service.expires_in_seconds(),
        user,
    }))
}

/// Get current user info
///
/// Reads the employee fresh from the database so a disabled account stops
/// working before its token expires
pub async fn me(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<Json<UserInfo>, AppError> {
    let employee = employee::find_by_id(&state.pool, user.id)
        .await?
        .filter(|e| e.is_active)
        .ok_or_else(AppError::not_authenticated)?;
    Ok(Json(user_info(&employee)))
}
