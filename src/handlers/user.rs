// src/handlers/user.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    error::AppError,
    services::progress::{user_achievements, user_history, user_stats, user_streak},
    store::DynStore,
    utils::jwt::Claims,
};

/// Current and best daily streak of a user.
pub async fn get_streak(
    State(store): State<DynStore>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(user_streak(store.as_ref(), user_id, Utc::now()).await?))
}

/// The full badge catalog with the user's unlock state.
pub async fn get_achievements(
    State(store): State<DynStore>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(user_achievements(store.as_ref(), user_id, Utc::now()).await?))
}

pub async fn get_stats(
    State(store): State<DynStore>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(user_stats(store.as_ref(), user_id, Utc::now()).await?))
}

/// Submission history, including graded answers.
/// Visible to the user themselves and to staff.
pub async fn list_submissions(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    Path(user_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    if claims.user_id()? != user_id && !claims.role()?.can_author() {
        return Err(AppError::Forbidden(
            "Cannot view another user's submissions".to_string(),
        ));
    }

    Ok(Json(user_history(store.as_ref(), user_id).await?))
}
