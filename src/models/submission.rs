// src/models/submission.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, types::Json};
use uuid::Uuid;
use validator::Validate;

/// One graded answer, with the question copied at grading time so later
/// edits to the challenge do not rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionAnswer {
    pub question_id: Uuid,
    pub question: String,
    pub options: Vec<String>,
    pub explanation: Option<String>,
    pub user_answer: String,
    pub correct_answer: String,
    pub is_correct: bool,
}

/// Represents the 'challenge_submissions' table in the database.
/// At most one row exists per (challenge_id, user_id).
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ChallengeSubmission {
    pub id: i64,
    pub challenge_id: i64,
    pub user_id: i64,

    /// Graded answers, stored as a JSON array in the database.
    pub answers: Json<Vec<SubmissionAnswer>>,

    pub score: i64,

    /// Challenge points at grading time.
    pub max_score: i64,

    /// Number of answers submitted.
    pub total_questions: i64,

    pub correct_answers: i64,

    /// Client-reported duration in seconds.
    pub time_spent: i64,

    pub submitted_at: DateTime<Utc>,
}

impl ChallengeSubmission {
    /// Score as a percentage of the challenge's points. Unanswered
    /// questions count against it.
    pub fn percentage(&self) -> f64 {
        if self.max_score <= 0 {
            return 0.0;
        }
        self.score as f64 * 100.0 / self.max_score as f64
    }

    /// Full points on the challenge, not just on the answers sent.
    pub fn is_perfect(&self) -> bool {
        self.max_score > 0 && self.score >= self.max_score
    }
}

/// Insert payload handed to the store.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub challenge_id: i64,
    pub user_id: i64,
    pub answers: Vec<SubmissionAnswer>,
    pub score: i64,
    pub max_score: i64,
    pub total_questions: i64,
    pub correct_answers: i64,
    pub time_spent: i64,
    pub submitted_at: DateTime<Utc>,
}

/// A single `(question, answer)` pair from the client.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SubmittedAnswer {
    pub question_id: Uuid,
    pub answer: String,
}

/// DTO for submitting a challenge attempt.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct SubmitChallengeRequest {
    #[validate(length(min = 1, message = "No answers submitted"))]
    pub answers: Vec<SubmittedAnswer>,

    /// Seconds the user spent on the attempt.
    #[validate(range(min = 0, message = "Time spent cannot be negative"))]
    pub time_spent: i64,
}

/// A leaderboard row as read from the store, joined with the user.
/// `username`/`email` are `None` when the user record no longer exists.
#[derive(Debug, Clone, FromRow)]
pub struct LeaderboardRow {
    pub user_id: i64,
    pub score: i64,
    pub time_spent: i64,
    pub correct_answers: i64,
    pub total_questions: i64,
    pub submitted_at: DateTime<Utc>,
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
}

/// Aggregated struct for displaying the leaderboard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub user_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub score: i64,
    pub correct_answers: i64,
    pub total_questions: i64,
    pub time_spent: i64,
    pub submitted_at: DateTime<Utc>,
    pub badge: Option<Medal>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub challenge_id: i64,
    pub entries: Vec<LeaderboardEntry>,
    pub total_participants: i64,
}

/// Response to a successful submission.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub submission_id: i64,
    pub challenge_id: i64,
    pub score: i64,
    pub max_score: i64,
    pub correct_answers: i64,
    pub total_questions: i64,
    pub time_spent: i64,
    pub answers: Vec<SubmissionAnswer>,
    pub submitted_at: DateTime<Utc>,
}

impl From<ChallengeSubmission> for SubmissionResult {
    fn from(submission: ChallengeSubmission) -> Self {
        SubmissionResult {
            submission_id: submission.id,
            challenge_id: submission.challenge_id,
            score: submission.score,
            max_score: submission.max_score,
            correct_answers: submission.correct_answers,
            total_questions: submission.total_questions,
            time_spent: submission.time_spent,
            answers: submission.answers.0,
            submitted_at: submission.submitted_at,
        }
    }
}
