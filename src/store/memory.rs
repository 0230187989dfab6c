// src/store/memory.rs

//! In-process store used when no database is configured, and by the tests.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::Utc;
use sqlx::types::Json;
use tokio::sync::RwLock;

use super::{ChallengeStore, StoreError, StoreResult};
use crate::{
    models::{
        challenge::{Challenge, ChallengeFilter, ChallengeStatus, NewChallenge},
        submission::{ChallengeSubmission, LeaderboardRow, NewSubmission},
        user::{NewUser, User},
    },
    scoring::leaderboard::compare_rows,
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    challenges: BTreeMap<i64, Challenge>,
    submissions: BTreeMap<i64, ChallengeSubmission>,
    /// (challenge_id, user_id) -> submission id
    submission_index: HashMap<(i64, i64), i64>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChallengeStore for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .values()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(StoreError::Conflict(format!(
                "Username '{}' or email already exists",
                user.username
            )));
        }

        let id = tables.next_id();
        let record = User {
            id,
            username: user.username,
            email: user.email,
            password: user.password_hash,
            role: user.role.as_str().to_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(id, record.clone());
        Ok(record)
    }

    async fn find_user(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_username(&self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.username == username).cloned())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().rev().cloned().collect())
    }

    async fn delete_user(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let removed = tables.users.remove(&id).is_some();
        if removed {
            for challenge in tables.challenges.values_mut() {
                if challenge.created_by == Some(id) {
                    challenge.created_by = None;
                }
            }
        }
        Ok(removed)
    }

    async fn create_challenge(&self, challenge: NewChallenge) -> StoreResult<Challenge> {
        let mut tables = self.tables.write().await;
        let id = tables.next_id();
        let record = Challenge {
            id,
            title: challenge.title,
            category: challenge.category,
            difficulty: challenge.difficulty,
            points: challenge.points,
            description: challenge.description,
            start_time: challenge.start_time,
            end_time: challenge.end_time,
            questions: challenge.questions,
            status: challenge.status,
            created_by: challenge.created_by,
            attempts: 0,
            success_rate: 0,
            created_at: Utc::now(),
        };
        tables.challenges.insert(id, record.clone());
        Ok(record)
    }

    async fn get_challenge(&self, id: i64) -> StoreResult<Option<Challenge>> {
        Ok(self.tables.read().await.challenges.get(&id).cloned())
    }

    async fn list_challenges(&self, filter: ChallengeFilter) -> StoreResult<Vec<Challenge>> {
        let tables = self.tables.read().await;
        let mut list: Vec<Challenge> = tables
            .challenges
            .values()
            .filter(|c| filter.category.is_none_or(|cat| c.category == cat))
            .filter(|c| filter.status.is_none_or(|status| c.status == status))
            .cloned()
            .collect();
        list.sort_by(|a, b| b.start_time.cmp(&a.start_time).then(b.id.cmp(&a.id)));
        Ok(list)
    }

    async fn set_challenge_status(&self, id: i64, status: ChallengeStatus) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(match tables.challenges.get_mut(&id) {
            Some(challenge) => {
                challenge.status = status;
                true
            }
            None => false,
        })
    }

    async fn delete_challenge(&self, id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.challenges.remove(&id).is_none() {
            return Ok(false);
        }
        tables.submissions.retain(|_, s| s.challenge_id != id);
        tables.submission_index.retain(|(cid, _), _| *cid != id);
        Ok(true)
    }

    async fn increment_attempts(&self, id: i64) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(challenge) = tables.challenges.get_mut(&id) {
            challenge.attempts += 1;
        }
        Ok(())
    }

    async fn set_success_rate(&self, id: i64, rate: i64) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        if let Some(challenge) = tables.challenges.get_mut(&id) {
            challenge.success_rate = rate;
        }
        Ok(())
    }

    async fn find_submission(
        &self,
        challenge_id: i64,
        user_id: i64,
    ) -> StoreResult<Option<ChallengeSubmission>> {
        let tables = self.tables.read().await;
        Ok(tables
            .submission_index
            .get(&(challenge_id, user_id))
            .and_then(|id| tables.submissions.get(id))
            .cloned())
    }

    async fn insert_submission(
        &self,
        submission: NewSubmission,
    ) -> StoreResult<ChallengeSubmission> {
        let mut tables = self.tables.write().await;
        let key = (submission.challenge_id, submission.user_id);
        if tables.submission_index.contains_key(&key) {
            return Err(StoreError::Conflict(
                "Submission already exists for this challenge and user".to_string(),
            ));
        }

        let id = tables.next_id();
        let record = ChallengeSubmission {
            id,
            challenge_id: submission.challenge_id,
            user_id: submission.user_id,
            answers: Json(submission.answers),
            score: submission.score,
            max_score: submission.max_score,
            total_questions: submission.total_questions,
            correct_answers: submission.correct_answers,
            time_spent: submission.time_spent,
            submitted_at: submission.submitted_at,
        };
        tables.submission_index.insert(key, id);
        tables.submissions.insert(id, record.clone());
        Ok(record)
    }

    async fn challenge_submissions(
        &self,
        challenge_id: i64,
    ) -> StoreResult<Vec<ChallengeSubmission>> {
        let tables = self.tables.read().await;
        Ok(tables
            .submissions
            .values()
            .filter(|s| s.challenge_id == challenge_id)
            .cloned()
            .collect())
    }

    async fn user_submissions(&self, user_id: i64) -> StoreResult<Vec<ChallengeSubmission>> {
        let tables = self.tables.read().await;
        let mut list: Vec<ChallengeSubmission> = tables
            .submissions
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect();
        list.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));
        Ok(list)
    }

    async fn leaderboard_rows(
        &self,
        challenge_id: i64,
        limit: i64,
    ) -> StoreResult<Vec<LeaderboardRow>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<LeaderboardRow> = tables
            .submissions
            .values()
            .filter(|s| s.challenge_id == challenge_id)
            .map(|s| {
                let user = tables.users.get(&s.user_id);
                LeaderboardRow {
                    user_id: s.user_id,
                    score: s.score,
                    time_spent: s.time_spent,
                    correct_answers: s.correct_answers,
                    total_questions: s.total_questions,
                    submitted_at: s.submitted_at,
                    username: user.map(|u| u.username.clone()),
                    email: user.map(|u| u.email.clone()),
                }
            })
            .collect();
        rows.sort_by(compare_rows);
        rows.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(rows)
    }

    async fn count_submissions(&self, challenge_id: i64) -> StoreResult<i64> {
        let tables = self.tables.read().await;
        Ok(tables
            .submissions
            .values()
            .filter(|s| s.challenge_id == challenge_id)
            .count() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::user::Role;

    fn new_submission(challenge_id: i64, user_id: i64) -> NewSubmission {
        NewSubmission {
            challenge_id,
            user_id,
            answers: vec![],
            score: 10,
            max_score: 100,
            total_questions: 1,
            correct_answers: 1,
            time_spent: 30,
            submitted_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_submission_conflicts() {
        let store = MemoryStore::new();
        store.insert_submission(new_submission(1, 2)).await.unwrap();

        let second = store.insert_submission(new_submission(1, 2)).await;
        assert!(matches!(second, Err(StoreError::Conflict(_))));
        assert_eq!(store.count_submissions(1).await.unwrap(), 1);

        // Same user, other challenge is fine
        assert!(store.insert_submission(new_submission(3, 2)).await.is_ok());
    }

    #[tokio::test]
    async fn test_deleted_user_leaves_anonymous_row() {
        let store = MemoryStore::new();
        let user = store
            .create_user(NewUser {
                username: "ghost".into(),
                email: "ghost@example.com".into(),
                password_hash: "x".into(),
                role: Role::Student,
            })
            .await
            .unwrap();
        store.insert_submission(new_submission(1, user.id)).await.unwrap();
        assert!(store.delete_user(user.id).await.unwrap());

        let rows = store.leaderboard_rows(1, 100).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert!(rows[0].username.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_username_conflicts() {
        let store = MemoryStore::new();
        let user = || NewUser {
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "x".into(),
            role: Role::Student,
        };
        store.create_user(user()).await.unwrap();
        assert!(matches!(
            store.create_user(user()).await,
            Err(StoreError::Conflict(_))
        ));
    }
}
