// src/services/submission.rs

//! Submit pipeline and the per-challenge leaderboard read path.

use chrono::Utc;
use validator::Validate;

use crate::{
    config::LEADERBOARD_LIMIT,
    error::AppError,
    models::{
        challenge::Challenge,
        submission::{
            LeaderboardResponse, NewSubmission, SubmissionResult, SubmitChallengeRequest,
        },
    },
    scoring::{
        aggregate::success_rate, grader::grade_answers, leaderboard::rank_rows,
        score::calculate_score,
    },
    store::{ChallengeStore, StoreError},
};

pub const ALREADY_SUBMITTED: &str = "You have already submitted this challenge";
pub const CHALLENGE_NOT_FOUND: &str = "Challenge not found";

/// Loads a challenge that users are allowed to see. Drafts count as missing.
pub async fn load_published_challenge(
    store: &dyn ChallengeStore,
    challenge_id: i64,
) -> Result<Challenge, AppError> {
    store
        .get_challenge(challenge_id)
        .await?
        .filter(Challenge::is_published)
        .ok_or_else(|| AppError::NotFound(CHALLENGE_NOT_FOUND.to_string()))
}

/// Grades and stores a user's single attempt at a challenge.
///
/// * Rejects a second attempt before grading anything.
/// * Rejects the whole attempt if any answer targets an unknown question.
/// * Updates the challenge's attempt counter and success rate afterwards.
pub async fn submit_challenge(
    store: &dyn ChallengeStore,
    challenge_id: i64,
    user_id: i64,
    req: SubmitChallengeRequest,
) -> Result<SubmissionResult, AppError> {
    req.validate()?;

    let challenge = load_published_challenge(store, challenge_id).await?;

    if store.find_submission(challenge_id, user_id).await?.is_some() {
        tracing::warn!(challenge_id, user_id, "Rejected repeated submission");
        return Err(AppError::Conflict(ALREADY_SUBMITTED.to_string()));
    }

    let graded = grade_answers(&challenge.questions, &req.answers).map_err(|e| {
        tracing::warn!(challenge_id, user_id, "Rejected submission: {}", e);
        AppError::from(e)
    })?;

    let score = calculate_score(challenge.points, challenge.number_of_questions(), graded.correct)
        .ok_or_else(|| {
            AppError::InternalServerError(format!("Challenge {} has no questions", challenge_id))
        })?;

    let new_submission = NewSubmission {
        challenge_id,
        user_id,
        total_questions: graded.answers.len() as i64,
        correct_answers: graded.correct as i64,
        answers: graded.answers,
        score,
        max_score: challenge.points,
        time_spent: req.time_spent,
        submitted_at: Utc::now(),
    };

    // The unique (challenge_id, user_id) constraint settles concurrent attempts.
    let submission = store
        .insert_submission(new_submission)
        .await
        .map_err(|e| match e {
            StoreError::Conflict(_) => {
                tracing::warn!(challenge_id, user_id, "Lost submission race");
                AppError::Conflict(ALREADY_SUBMITTED.to_string())
            }
            other => AppError::from(other),
        })?;

    tracing::info!(
        challenge_id,
        user_id,
        score,
        correct = submission.correct_answers,
        "Submission graded"
    );

    // Not transactional with the insert: a failure here leaves the counters
    // stale until the next submission recomputes them.
    if let Err(e) = recompute_aggregates(store, &challenge).await {
        tracing::error!(challenge_id, "Failed to update challenge aggregates: {}", e);
    }

    Ok(submission.into())
}

/// Bumps `attempts` and recomputes `success_rate` over every submission.
pub async fn recompute_aggregates(
    store: &dyn ChallengeStore,
    challenge: &Challenge,
) -> Result<(), StoreError> {
    store.increment_attempts(challenge.id).await?;

    let scores: Vec<i64> = store
        .challenge_submissions(challenge.id)
        .await?
        .iter()
        .map(|s| s.score)
        .collect();
    let rate = success_rate(challenge.points, &scores);

    store.set_success_rate(challenge.id, rate).await?;
    tracing::debug!(challenge_id = challenge.id, rate, "Success rate recomputed");
    Ok(())
}

/// The caller's own graded attempt at a challenge.
pub async fn own_submission(
    store: &dyn ChallengeStore,
    challenge_id: i64,
    user_id: i64,
) -> Result<SubmissionResult, AppError> {
    store
        .get_challenge(challenge_id)
        .await?
        .ok_or_else(|| AppError::NotFound(CHALLENGE_NOT_FOUND.to_string()))?;

    let submission = store
        .find_submission(challenge_id, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("No submission for this challenge".to_string()))?;

    Ok(submission.into())
}

/// Top entries for a challenge plus the uncapped participant count.
pub async fn challenge_leaderboard(
    store: &dyn ChallengeStore,
    challenge_id: i64,
) -> Result<LeaderboardResponse, AppError> {
    load_published_challenge(store, challenge_id).await?;

    let rows = store.leaderboard_rows(challenge_id, LEADERBOARD_LIMIT).await?;
    let total_participants = store.count_submissions(challenge_id).await?;

    Ok(LeaderboardResponse {
        challenge_id,
        entries: rank_rows(rows, LEADERBOARD_LIMIT as usize),
        total_participants,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::{
            challenge::{
                Category, ChallengeStatus, CreateChallengeRequest, CreateQuestionRequest,
                Difficulty,
            },
            submission::SubmittedAnswer,
        },
        store::MemoryStore,
    };
    use chrono::Duration;
    use uuid::Uuid;

    async fn seed_challenge(store: &MemoryStore, status: ChallengeStatus) -> Challenge {
        let start = Utc::now() - Duration::hours(1);
        let req = CreateChallengeRequest {
            title: "Ten questions".to_string(),
            category: Category::Daily,
            difficulty: Difficulty::Medium,
            points: 100,
            description: String::new(),
            start_time: start,
            end_time: start + Duration::days(1),
            questions: (0..10)
                .map(|i| CreateQuestionRequest {
                    question: format!("Q{}", i),
                    options: vec!["yes".to_string(), "no".to_string()],
                    answer: "yes".to_string(),
                    explanation: None,
                })
                .collect(),
            status,
        };
        store.create_challenge(req.into_new_challenge(1)).await.unwrap()
    }

    fn answers(challenge: &Challenge, correct: usize) -> SubmitChallengeRequest {
        SubmitChallengeRequest {
            answers: challenge
                .questions
                .iter()
                .enumerate()
                .map(|(i, q)| SubmittedAnswer {
                    question_id: q.id,
                    answer: if i < correct { "yes" } else { "no" }.to_string(),
                })
                .collect(),
            time_spent: 120,
        }
    }

    #[tokio::test]
    async fn test_seven_of_ten_scores_seventy() {
        let store = MemoryStore::new();
        let challenge = seed_challenge(&store, ChallengeStatus::Published).await;

        let result = submit_challenge(&store, challenge.id, 42, answers(&challenge, 7))
            .await
            .unwrap();
        assert_eq!(result.score, 70);
        assert_eq!(result.correct_answers, 7);
        assert_eq!(result.total_questions, 10);

        let updated = store.get_challenge(challenge.id).await.unwrap().unwrap();
        assert_eq!(updated.attempts, 1);
        assert_eq!(updated.success_rate, 70);
    }

    #[tokio::test]
    async fn test_second_attempt_rejected_and_first_kept() {
        let store = MemoryStore::new();
        let challenge = seed_challenge(&store, ChallengeStatus::Published).await;

        submit_challenge(&store, challenge.id, 42, answers(&challenge, 5))
            .await
            .unwrap();
        let second = submit_challenge(&store, challenge.id, 42, answers(&challenge, 10)).await;
        assert!(matches!(second, Err(AppError::Conflict(msg)) if msg == ALREADY_SUBMITTED));

        let kept = store.find_submission(challenge.id, 42).await.unwrap().unwrap();
        assert_eq!(kept.score, 50);
        let updated = store.get_challenge(challenge.id).await.unwrap().unwrap();
        assert_eq!(updated.attempts, 1);
    }

    #[tokio::test]
    async fn test_unknown_question_leaves_no_trace() {
        let store = MemoryStore::new();
        let challenge = seed_challenge(&store, ChallengeStatus::Published).await;

        let mut req = answers(&challenge, 10);
        req.answers.push(SubmittedAnswer {
            question_id: Uuid::new_v4(),
            answer: "yes".to_string(),
        });

        let result = submit_challenge(&store, challenge.id, 42, req).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert!(store.find_submission(challenge.id, 42).await.unwrap().is_none());
        let updated = store.get_challenge(challenge.id).await.unwrap().unwrap();
        assert_eq!(updated.attempts, 0);
    }

    #[tokio::test]
    async fn test_partial_answer_set_is_not_perfect() {
        let store = MemoryStore::new();
        let challenge = seed_challenge(&store, ChallengeStatus::Published).await;

        let mut req = answers(&challenge, 10);
        req.answers.truncate(1);
        let result = submit_challenge(&store, challenge.id, 42, req).await.unwrap();
        assert_eq!(result.score, 10);
        assert_eq!(result.max_score, 100);
        assert_eq!(result.correct_answers, result.total_questions);

        let stored = store.find_submission(challenge.id, 42).await.unwrap().unwrap();
        assert!(!stored.is_perfect());
        assert_eq!(stored.percentage(), 10.0);
    }

    #[tokio::test]
    async fn test_missing_and_draft_challenges_not_found() {
        let store = MemoryStore::new();
        let draft = seed_challenge(&store, ChallengeStatus::Draft).await;

        let req = answers(&draft, 1);
        let result = submit_challenge(&store, draft.id, 42, req.clone()).await;
        assert!(matches!(result, Err(AppError::NotFound(msg)) if msg == CHALLENGE_NOT_FOUND));

        let result = submit_challenge(&store, 9999, 42, req).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_empty_answers_rejected() {
        let store = MemoryStore::new();
        let challenge = seed_challenge(&store, ChallengeStatus::Published).await;
        let req = SubmitChallengeRequest {
            answers: vec![],
            time_spent: 10,
        };
        let result = submit_challenge(&store, challenge.id, 42, req).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[tokio::test]
    async fn test_success_rate_is_mean_over_all_submissions() {
        let store = MemoryStore::new();
        let challenge = seed_challenge(&store, ChallengeStatus::Published).await;

        for (user, correct) in [(1, 10), (2, 5), (3, 2)] {
            submit_challenge(&store, challenge.id, user, answers(&challenge, correct))
                .await
                .unwrap();
        }

        let updated = store.get_challenge(challenge.id).await.unwrap().unwrap();
        assert_eq!(updated.attempts, 3);
        // (100 + 50 + 20) / 3 = 56.67
        assert_eq!(updated.success_rate, 57);
    }

    #[tokio::test]
    async fn test_concurrent_attempts_store_one_submission() {
        let store = std::sync::Arc::new(MemoryStore::new());
        let challenge = seed_challenge(&store, ChallengeStatus::Published).await;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let store = store.clone();
            let req = answers(&challenge, 3);
            let id = challenge.id;
            handles.push(tokio::spawn(async move {
                submit_challenge(store.as_ref(), id, 7, req).await.is_ok()
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap() {
                accepted += 1;
            }
        }
        assert_eq!(accepted, 1);
        assert_eq!(store.count_submissions(challenge.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_leaderboard_ranks_and_counts() {
        let store = MemoryStore::new();
        let challenge = seed_challenge(&store, ChallengeStatus::Published).await;

        for (user, correct, time) in [(1, 9, 120), (2, 9, 100), (3, 8, 50)] {
            let mut req = answers(&challenge, correct);
            req.time_spent = time;
            submit_challenge(&store, challenge.id, user, req).await.unwrap();
        }

        let board = challenge_leaderboard(&store, challenge.id).await.unwrap();
        assert_eq!(board.total_participants, 3);
        let order: Vec<_> = board.entries.iter().map(|e| (e.user_id, e.score)).collect();
        assert_eq!(order, vec![(2, 90), (1, 90), (3, 80)]);
        // No user rows were created, so every entry is anonymous
        assert!(board.entries.iter().all(|e| e.name == "Anonymous"));
    }
}
