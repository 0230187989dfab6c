// src/handlers/submission.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::submission::SubmitChallengeRequest,
    services::submission::{challenge_leaderboard, own_submission, submit_challenge},
    store::DynStore,
    utils::jwt::Claims,
};

/// Submits the caller's answers to a challenge.
///
/// * Each user gets exactly one attempt per challenge (409 afterwards).
/// * Answers to questions outside the challenge reject the whole attempt (404).
/// * The score is computed server side; returns 201 with the graded answers.
pub async fn submit(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    Path(challenge_id): Path<i64>,
    Json(req): Json<SubmitChallengeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    let result = submit_challenge(store.as_ref(), challenge_id, user_id, req).await?;

    Ok((StatusCode::CREATED, Json(result)))
}

/// Retrieves the top 100 entries of a challenge's leaderboard.
pub async fn get_leaderboard(
    State(store): State<DynStore>,
    Path(challenge_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(challenge_leaderboard(store.as_ref(), challenge_id).await?))
}

/// Returns the caller's graded submission for a challenge.
pub async fn get_my_submission(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    Path(challenge_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let user_id = claims.user_id()?;
    Ok(Json(own_submission(store.as_ref(), challenge_id, user_id).await?))
}
