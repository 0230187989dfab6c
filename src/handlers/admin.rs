// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{error::AppError, store::DynStore, utils::jwt::Claims};

/// Lists all users in the system.
/// Admin only.
pub async fn list_users(State(store): State<DynStore>) -> Result<impl IntoResponse, AppError> {
    Ok(Json(store.list_users().await?))
}

/// Deletes a user by ID.
/// Admin only. Prevents deleting self. The user's submissions are kept and
/// show up as anonymous on leaderboards.
pub async fn delete_user(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if id == claims.user_id()? {
        return Err(AppError::BadRequest("Cannot delete yourself".to_string()));
    }

    if !store.delete_user(id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tracing::info!(user_id = id, "User deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Deletes a challenge and every submission made to it.
/// Admin only.
pub async fn delete_challenge(
    State(store): State<DynStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if !store.delete_challenge(id).await? {
        return Err(AppError::NotFound("Challenge not found".to_string()));
    }

    tracing::info!(challenge_id = id, "Challenge deleted");
    Ok(StatusCode::NO_CONTENT)
}
