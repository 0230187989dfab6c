// src/services/progress.rs

//! Per-user read paths: streaks, achievements, history and stats.
//! Everything is derived from the submission history on each call.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppError,
    models::submission::ChallengeSubmission,
    scoring::{
        achievements::{Achievement, average_percentage, evaluate_achievements},
        streak::{Streak, calculate_streak},
    },
    store::ChallengeStore,
};

#[derive(Debug, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: i64,
    pub total_submissions: usize,
    pub total_score: i64,
    /// Rounded mean of score / max_score percentages.
    pub average_percentage: i64,
    pub perfect_scores: usize,
    pub fastest_time: Option<i64>,
    pub current_streak: u32,
    pub best_streak: u32,
    pub achievements_unlocked: usize,
}

/// Submission history of an existing user, newest first.
pub async fn user_history(
    store: &dyn ChallengeStore,
    user_id: i64,
) -> Result<Vec<ChallengeSubmission>, AppError> {
    store
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(store.user_submissions(user_id).await?)
}

fn streak_of(submissions: &[ChallengeSubmission], now: DateTime<Utc>) -> Streak {
    let timestamps: Vec<DateTime<Utc>> = submissions.iter().map(|s| s.submitted_at).collect();
    calculate_streak(&timestamps, now.date_naive())
}

pub async fn user_streak(
    store: &dyn ChallengeStore,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<Streak, AppError> {
    let history = user_history(store, user_id).await?;
    Ok(streak_of(&history, now))
}

pub async fn user_achievements(
    store: &dyn ChallengeStore,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<Vec<Achievement>, AppError> {
    let history = user_history(store, user_id).await?;
    let streak = streak_of(&history, now);
    Ok(evaluate_achievements(&history, streak, now))
}

pub async fn user_stats(
    store: &dyn ChallengeStore,
    user_id: i64,
    now: DateTime<Utc>,
) -> Result<UserStats, AppError> {
    let history = user_history(store, user_id).await?;
    let streak = streak_of(&history, now);
    let achievements = evaluate_achievements(&history, streak, now);

    Ok(UserStats {
        user_id,
        total_submissions: history.len(),
        total_score: history.iter().map(|s| s.score).sum(),
        average_percentage: average_percentage(&history).round() as i64,
        perfect_scores: history.iter().filter(|s| s.is_perfect()).count(),
        fastest_time: history.iter().map(|s| s.time_spent).min(),
        current_streak: streak.current,
        best_streak: streak.best,
        achievements_unlocked: achievements.iter().filter(|a| a.unlocked).count(),
    })
}
