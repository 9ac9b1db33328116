//! Authentication Handlers
//!
//! Registration, login, token refresh, and logout

use axum::{Extension, Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::CurrentUser;
use crate::common::{AppError, AppResponse, AppResult, ok_with_message};
use crate::core::ServerState;
use crate::db::models::{User, UserCreate};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub user_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub access_token: String,
}

/// POST /api/auth/register - create a user account
///
/// New accounts default to the "user" role and are not approved; an
/// unapproved account cannot log in.
pub async fn register(
    State(state): State<ServerState>,
    Json(req): Json<UserCreate>,
) -> AppResult<(StatusCode, Json<AppResponse<User>>)> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let existing = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(&req.username)
        .fetch_optional(state.db.pool())
        .await?;
    if existing.is_some() {
        return Err(AppError::conflict("User already exists"));
    }

    let password_hash = User::hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

    let created_at = Utc::now().timestamp_millis();
    let id = sqlx::query(
        "INSERT INTO users (username, password_hash, first_name, last_name, role, approved, created_at) \
         VALUES (?, ?, ?, ?, 'user', 0, ?)",
    )
    .bind(&req.username)
    .bind(&password_hash)
    .bind(&req.first_name)
    .bind(&req.last_name)
    .bind(created_at)
    .execute(state.db.pool())
    .await?
    .last_insert_rowid();

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_one(state.db.pool())
        .await?;

    tracing::info!(user_id = id, username = %user.username, "User registered");
    Ok((
        StatusCode::CREATED,
        ok_with_message(user, "User registered successfully"),
    ))
}

/// POST /api/auth/login - authenticate and mint tokens
///
/// Mints a short-lived access token and a long-lived refresh token, each
/// signed with its own secret, and records the login as session activity
/// (creating the session row on first login).
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<AppResponse<LoginResponse>>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
        .bind(&req.username)
        .fetch_optional(state.db.pool())
        .await?
        .ok_or_else(|| AppError::validation("Invalid login, please try again"))?;

    if !user.approved {
        return Err(AppError::validation(
            "This account has not been approved yet",
        ));
    }

    let password_valid = user
        .verify_password(&req.password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
    if !password_valid {
        tracing::warn!(target: "security", username = %req.username, "Login failed - invalid credentials");
        return Err(AppError::validation("Invalid login, please try again"));
    }

    let access_token = state
        .tokens()
        .issue_access(&user)
        .map_err(|e| AppError::internal(format!("Failed to create access token: {e}")))?;
    let refresh_token = state
        .tokens()
        .issue_refresh(&user)
        .map_err(|e| AppError::internal(format!("Failed to create refresh token: {e}")))?;

    // First session activity; every authenticated request slides it forward
    state.sessions().touch(user.id).await?;

    tracing::info!(user_id = user.id, username = %user.username, "User logged in");
    Ok(ok_with_message(
        LoginResponse {
            access_token,
            refresh_token,
            user_id: user.id,
        },
        format!("Hello {}, you logged in successfully", user.username),
    ))
}

/// POST /api/auth/refresh - exchange a refresh token for a new access token
///
/// Re-validates the refresh credential, re-resolves the user, and mints a
/// new access token only; the refresh token is not rotated.
pub async fn refresh(
    State(state): State<ServerState>,
    Json(req): Json<RefreshRequest>,
) -> AppResult<Json<AppResponse<RefreshResponse>>> {
    let current = state
        .tokens()
        .verify_refresh(&req.refresh_token)
        .map_err(|_| AppError::invalid_token("Invalid refresh token"))?;

    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(current.user_id)
        .fetch_optional(state.db.pool())
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {} not found", current.user_id)))?;

    let access_token = state
        .tokens()
        .issue_access(&user)
        .map_err(|e| AppError::internal(format!("Failed to create access token: {e}")))?;

    Ok(ok_with_message(
        RefreshResponse { access_token },
        "Access token refreshed",
    ))
}

/// POST /api/auth/logout - expire the caller's session
pub async fn logout(
    State(state): State<ServerState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<Json<AppResponse<()>>> {
    state.sessions().expire(user.user_id).await?;

    tracing::info!(user_id = user.user_id, username = %user.username, "User logged out");
    Ok(ok_with_message((), "Logged out"))
}
