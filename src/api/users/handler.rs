//! User Administration Handlers

use axum::{
    Json,
    extract::{Path, State},
};
use validator::Validate;

use crate::common::{AppError, AppResponse, AppResult, ok, ok_with_message};
use crate::core::ServerState;
use crate::db::models::{User, UserUpdate};

/// GET /api/users - list all users (admin only)
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<AppResponse<Vec<User>>>> {
    let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY id")
        .fetch_all(state.db.pool())
        .await?;

    Ok(ok(users))
}

/// PUT /api/users/{id} - partial update of a user account
///
/// A changed password must differ from the current one and is re-hashed
/// before storage.
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(req): Json<UserUpdate>,
) -> AppResult<Json<AppResponse<User>>> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let mut user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(state.db.pool())
        .await?
        .ok_or_else(|| AppError::not_found(format!("User {id} not found")))?;

    if let Some(username) = req.username {
        user.username = username;
    }
    if let Some(password) = req.password {
        let same = user
            .verify_password(&password)
            .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
        if same {
            return Err(AppError::validation("Please use a different password"));
        }
        user.password_hash = User::hash_password(&password)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;
    }
    if let Some(first_name) = req.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = req.last_name {
        user.last_name = last_name;
    }

    sqlx::query(
        "UPDATE users SET username = ?, password_hash = ?, first_name = ?, last_name = ? WHERE id = ?",
    )
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.first_name)
    .bind(&user.last_name)
    .bind(id)
    .execute(state.db.pool())
    .await?;

    tracing::info!(user_id = id, "User updated");
    Ok(ok_with_message(user, "Updated user successfully"))
}
