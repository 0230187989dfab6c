// src/store/mod.rs

//! Storage collaborator for users, challenges and submissions.
//!
//! The `(challenge_id, user_id)` uniqueness of submissions is enforced here,
//! by the backend, and reported as [`StoreError::Conflict`].

pub mod memory;
pub mod postgres;

use std::{fmt, sync::Arc};

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        challenge::{Challenge, ChallengeFilter, ChallengeStatus, NewChallenge},
        submission::{ChallengeSubmission, LeaderboardRow, NewSubmission},
        user::{NewUser, User},
    },
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    Conflict(String),
    /// A stored row could not be mapped back to a model.
    Corrupt(String),
    Database(sqlx::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict(msg) => write!(f, "conflict: {}", msg),
            StoreError::Corrupt(msg) => write!(f, "corrupt row: {}", msg),
            StoreError::Database(err) => write!(f, "database error: {}", err),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            other => AppError::InternalServerError(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ChallengeStore: Send + Sync {
    // Users
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user(&self, id: i64) -> StoreResult<Option<User>>;
    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;
    /// Deletes the user row only; their submissions stay behind.
    async fn delete_user(&self, id: i64) -> StoreResult<bool>;

    // Challenges
    async fn create_challenge(&self, challenge: NewChallenge) -> StoreResult<Challenge>;
    async fn get_challenge(&self, id: i64) -> StoreResult<Option<Challenge>>;
    async fn list_challenges(&self, filter: ChallengeFilter) -> StoreResult<Vec<Challenge>>;
    async fn set_challenge_status(&self, id: i64, status: ChallengeStatus) -> StoreResult<bool>;
    /// Deletes the challenge together with its submissions.
    async fn delete_challenge(&self, id: i64) -> StoreResult<bool>;
    /// Atomically adds one to `attempts`.
    async fn increment_attempts(&self, id: i64) -> StoreResult<()>;
    async fn set_success_rate(&self, id: i64, rate: i64) -> StoreResult<()>;

    // Submissions
    async fn find_submission(
        &self,
        challenge_id: i64,
        user_id: i64,
    ) -> StoreResult<Option<ChallengeSubmission>>;
    /// Fails with [`StoreError::Conflict`] if the pair already has a submission.
    async fn insert_submission(&self, submission: NewSubmission)
    -> StoreResult<ChallengeSubmission>;
    async fn challenge_submissions(&self, challenge_id: i64)
    -> StoreResult<Vec<ChallengeSubmission>>;
    /// All submissions of a user, newest first.
    async fn user_submissions(&self, user_id: i64) -> StoreResult<Vec<ChallengeSubmission>>;
    /// Top `limit` rows in leaderboard order, joined with their users.
    async fn leaderboard_rows(&self, challenge_id: i64, limit: i64)
    -> StoreResult<Vec<LeaderboardRow>>;
    async fn count_submissions(&self, challenge_id: i64) -> StoreResult<i64>;
}

pub type DynStore = Arc<dyn ChallengeStore>;
