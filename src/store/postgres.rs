// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool, types::Json};

use super::{ChallengeStore, StoreError, StoreResult};
use crate::models::{
    challenge::{Challenge, ChallengeFilter, ChallengeStatus, NewChallenge, Question},
    submission::{ChallengeSubmission, LeaderboardRow, NewSubmission},
    user::{NewUser, User},
};

const USER_COLUMNS: &str = "id, username, email, password, role, created_at";

const CHALLENGE_COLUMNS: &str = "id, title, category, difficulty, points, description, \
     start_time, end_time, questions, status, created_by, attempts, success_rate, created_at";

const SUBMISSION_COLUMNS: &str = "id, challenge_id, user_id, answers, score, max_score, \
     total_questions, correct_answers, time_spent, submitted_at";

/// Raw 'challenges' row; enum columns are stored as text.
#[derive(FromRow)]
struct ChallengeRow {
    id: i64,
    title: String,
    category: String,
    difficulty: String,
    points: i64,
    description: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    questions: Json<Vec<Question>>,
    status: String,
    created_by: Option<i64>,
    attempts: i64,
    success_rate: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<ChallengeRow> for Challenge {
    type Error = StoreError;

    fn try_from(row: ChallengeRow) -> Result<Self, Self::Error> {
        Ok(Challenge {
            id: row.id,
            title: row.title,
            category: row.category.parse().map_err(StoreError::Corrupt)?,
            difficulty: row.difficulty.parse().map_err(StoreError::Corrupt)?,
            points: row.points,
            description: row.description,
            start_time: row.start_time,
            end_time: row.end_time,
            questions: row.questions.0,
            status: row.status.parse().map_err(StoreError::Corrupt)?,
            created_by: row.created_by,
            attempts: row.attempts,
            success_rate: row.success_rate,
            created_at: row.created_at,
        })
    }
}

/// Maps a unique-constraint violation to [`StoreError::Conflict`].
fn conflict_on_unique(err: sqlx::Error, msg: impl Into<String>) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(msg.into()),
        _ => StoreError::Database(err),
    }
}

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChallengeStore for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let sql = format!(
            "INSERT INTO users (username, email, password, role) VALUES ($1, $2, $3, $4) \
             RETURNING {}",
            USER_COLUMNS
        );
        sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                conflict_on_unique(
                    e,
                    format!("Username '{}' or email already exists", user.username),
                )
            })
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let sql = format!("SELECT {} FROM users WHERE username = $1", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let sql = format!("SELECT {} FROM users ORDER BY id DESC", USER_COLUMNS);
        Ok(sqlx::query_as::<_, User>(&sql).fetch_all(&self.pool).await?)
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_challenge(&self, challenge: NewChallenge) -> StoreResult<Challenge> {
        let sql = format!(
            r#"
            INSERT INTO challenges
            (title, category, difficulty, points, description, start_time, end_time, questions, status, created_by)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            CHALLENGE_COLUMNS
        );
        let row = sqlx::query_as::<_, ChallengeRow>(&sql)
            .bind(&challenge.title)
            .bind(challenge.category.as_str())
            .bind(challenge.difficulty.as_str())
            .bind(challenge.points)
            .bind(&challenge.description)
            .bind(challenge.start_time)
            .bind(challenge.end_time)
            .bind(Json(&challenge.questions))
            .bind(challenge.status.as_str())
            .bind(challenge.created_by)
            .fetch_one(&self.pool)
            .await?;
        row.try_into()
    }

    async fn get_challenge(&self, id: i64) -> StoreResult<Option<Challenge>> {
        let sql = format!("SELECT {} FROM challenges WHERE id = $1", CHALLENGE_COLUMNS);
        sqlx::query_as::<_, ChallengeRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Challenge::try_from)
            .transpose()
    }

    async fn list_challenges(&self, filter: ChallengeFilter) -> StoreResult<Vec<Challenge>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM challenges
            WHERE ($1::TEXT IS NULL OR category = $1)
              AND ($2::TEXT IS NULL OR status = $2)
            ORDER BY start_time DESC, id DESC
            "#,
            CHALLENGE_COLUMNS
        );
        sqlx::query_as::<_, ChallengeRow>(&sql)
            .bind(filter.category.map(|c| c.as_str()))
            .bind(filter.status.map(|s| s.as_str()))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(Challenge::try_from)
            .collect()
    }

    async fn set_challenge_status(&self, id: i64, status: ChallengeStatus) -> StoreResult<bool> {
        let result = sqlx::query("UPDATE challenges SET status = $1 WHERE id = $2")
            .bind(status.as_str())
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_challenge(&self, id: i64) -> StoreResult<bool> {
        // Submissions go with it through ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM challenges WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn increment_attempts(&self, id: i64) -> StoreResult<()> {
        sqlx::query("UPDATE challenges SET attempts = attempts + 1 WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_success_rate(&self, id: i64, rate: i64) -> StoreResult<()> {
        sqlx::query("UPDATE challenges SET success_rate = $1 WHERE id = $2")
            .bind(rate)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_submission(
        &self,
        challenge_id: i64,
        user_id: i64,
    ) -> StoreResult<Option<ChallengeSubmission>> {
        let sql = format!(
            "SELECT {} FROM challenge_submissions WHERE challenge_id = $1 AND user_id = $2",
            SUBMISSION_COLUMNS
        );
        Ok(sqlx::query_as::<_, ChallengeSubmission>(&sql)
            .bind(challenge_id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn insert_submission(
        &self,
        submission: NewSubmission,
    ) -> StoreResult<ChallengeSubmission> {
        let sql = format!(
            r#"
            INSERT INTO challenge_submissions
            (challenge_id, user_id, answers, score, max_score, total_questions, correct_answers, time_spent, submitted_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {}
            "#,
            SUBMISSION_COLUMNS
        );
        sqlx::query_as::<_, ChallengeSubmission>(&sql)
            .bind(submission.challenge_id)
            .bind(submission.user_id)
            .bind(Json(&submission.answers))
            .bind(submission.score)
            .bind(submission.max_score)
            .bind(submission.total_questions)
            .bind(submission.correct_answers)
            .bind(submission.time_spent)
            .bind(submission.submitted_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                conflict_on_unique(e, "Submission already exists for this challenge and user")
            })
    }

    async fn challenge_submissions(
        &self,
        challenge_id: i64,
    ) -> StoreResult<Vec<ChallengeSubmission>> {
        let sql = format!(
            "SELECT {} FROM challenge_submissions WHERE challenge_id = $1 ORDER BY id",
            SUBMISSION_COLUMNS
        );
        Ok(sqlx::query_as::<_, ChallengeSubmission>(&sql)
            .bind(challenge_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn user_submissions(&self, user_id: i64) -> StoreResult<Vec<ChallengeSubmission>> {
        let sql = format!(
            "SELECT {} FROM challenge_submissions WHERE user_id = $1 ORDER BY submitted_at DESC",
            SUBMISSION_COLUMNS
        );
        Ok(sqlx::query_as::<_, ChallengeSubmission>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn leaderboard_rows(
        &self,
        challenge_id: i64,
        limit: i64,
    ) -> StoreResult<Vec<LeaderboardRow>> {
        Ok(sqlx::query_as::<_, LeaderboardRow>(
            r#"
            SELECT
                s.user_id,
                s.score,
                s.time_spent,
                s.correct_answers,
                s.total_questions,
                s.submitted_at,
                u.username,
                u.email
            FROM challenge_submissions s
            LEFT JOIN users u ON u.id = s.user_id
            WHERE s.challenge_id = $1
            ORDER BY s.score DESC, s.time_spent ASC, s.submitted_at ASC
            LIMIT $2
            "#,
        )
        .bind(challenge_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn count_submissions(&self, challenge_id: i64) -> StoreResult<i64> {
        Ok(
            sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM challenge_submissions WHERE challenge_id = $1",
            )
            .bind(challenge_id)
            .fetch_one(&self.pool)
            .await?,
        )
    }
}
