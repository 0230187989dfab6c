// src/handlers/challenge.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::challenge::{
        ChallengeFilter, ChallengeListParams, ChallengeStatus, ChallengeSummary,
        CreateChallengeRequest, UpdateStatusRequest,
    },
    services::submission::{CHALLENGE_NOT_FOUND, load_published_challenge},
    store::DynStore,
    utils::jwt::Claims,
};

/// Lists published challenges, optionally filtered by category.
pub async fn list_challenges(
    State(store): State<DynStore>,
    Query(params): Query<ChallengeListParams>,
) -> Result<impl IntoResponse, AppError> {
    let challenges = store
        .list_challenges(ChallengeFilter {
            category: params.category,
            status: Some(ChallengeStatus::Published),
        })
        .await?;

    let summaries: Vec<ChallengeSummary> = challenges.iter().map(|c| c.to_summary()).collect();
    Ok(Json(summaries))
}

/// Retrieves a published challenge without its answer key.
pub async fn get_challenge(
    State(store): State<DynStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let challenge = load_published_challenge(store.as_ref(), id).await?;
    Ok(Json(challenge.to_public()))
}

/// Creates a new challenge.
/// Instructors and admins only.
pub async fn create_challenge(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateChallengeRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate_all()?;

    let author = claims.user_id()?;
    let challenge = store
        .create_challenge(payload.into_new_challenge(author))
        .await?;

    tracing::info!(
        challenge_id = challenge.id,
        author,
        questions = challenge.number_of_questions(),
        "Challenge created"
    );
    Ok((StatusCode::CREATED, Json(challenge.to_summary())))
}

/// Publishes or unpublishes a challenge.
/// Only its author or an admin may do this.
pub async fn update_challenge_status(
    State(store): State<DynStore>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let challenge = store
        .get_challenge(id)
        .await?
        .ok_or(AppError::NotFound(CHALLENGE_NOT_FOUND.to_string()))?;

    let caller = claims.user_id()?;
    if challenge.created_by != Some(caller) && !claims.is_admin() {
        return Err(AppError::Forbidden(
            "Only the author can change this challenge".to_string(),
        ));
    }

    store.set_challenge_status(id, payload.status).await?;
    tracing::info!(challenge_id = id, status = payload.status.as_str(), "Challenge status changed");

    Ok(StatusCode::OK)
}
