//! Achievement definitions and evaluation.
//!
//! Every badge is an independent predicate over a user's submission history
//! and streak. Nothing is persisted: the catalog is evaluated on each request.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{config::SPEED_RUN_SECONDS, models::submission::ChallengeSubmission};

use super::streak::Streak;

/// What unlocks a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// At least this many submissions.
    Submissions(usize),
    /// A submission worth the challenge's full points.
    PerfectScore,
    /// A submission finished in under `SPEED_RUN_SECONDS`.
    SpeedRun,
    /// Current streak of at least this many days.
    CurrentStreak(u32),
    /// Average score percentage of at least `percent` over at least `min_submissions`.
    AverageAtLeast { percent: u32, min_submissions: usize },
}

/// A badge definition.
#[derive(Debug, Clone, Copy)]
pub struct Badge {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub condition: Condition,
}

impl Badge {
    pub const fn new(
        id: &'static str,
        name: &'static str,
        description: &'static str,
        icon: &'static str,
        condition: Condition,
    ) -> Self {
        Self {
            id,
            name,
            description,
            icon,
            condition,
        }
    }
}

/// All available badges, in display order.
pub const BADGES: &[Badge] = &[
    Badge::new(
        "first_challenge",
        "First Steps",
        "Complete your first challenge",
        "🎯",
        Condition::Submissions(1),
    ),
    Badge::new(
        "challenge_regular",
        "Regular",
        "Complete 10 challenges",
        "📚",
        Condition::Submissions(10),
    ),
    Badge::new(
        "challenge_veteran",
        "Veteran",
        "Complete 50 challenges",
        "🏛️",
        Condition::Submissions(50),
    ),
    Badge::new(
        "perfect_score",
        "Perfectionist",
        "Answer every question of a challenge correctly",
        "💯",
        Condition::PerfectScore,
    ),
    Badge::new(
        "speed_runner",
        "Speed Runner",
        "Finish a challenge in under 5 minutes",
        "⚡",
        Condition::SpeedRun,
    ),
    Badge::new(
        "streak_3",
        "On Fire",
        "Submit challenges 3 days in a row",
        "🔥",
        Condition::CurrentStreak(3),
    ),
    Badge::new(
        "streak_7",
        "Unstoppable",
        "Submit challenges 7 days in a row",
        "🚀",
        Condition::CurrentStreak(7),
    ),
    Badge::new(
        "high_achiever",
        "High Achiever",
        "Average at least 80% over 5 or more challenges",
        "🏆",
        Condition::AverageAtLeast {
            percent: 80,
            min_submissions: 5,
        },
    ),
];

/// A badge annotated with the user's unlock state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Achievement {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub unlocked: bool,
    /// Time of the triggering submission where one exists, otherwise the
    /// evaluation time. Derived on every call, not stored.
    pub unlocked_at: Option<DateTime<Utc>>,
}

/// Mean percentage across submissions, 0 for an empty history.
pub fn average_percentage<'a, I>(submissions: I) -> f64
where
    I: IntoIterator<Item = &'a ChallengeSubmission>,
{
    let (sum, count) = submissions
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), s| (sum + s.percentage(), count + 1));

    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Evaluates the full catalog against a user's history.
pub fn evaluate_achievements(
    submissions: &[ChallengeSubmission],
    streak: Streak,
    now: DateTime<Utc>,
) -> Vec<Achievement> {
    let mut chronological: Vec<&ChallengeSubmission> = submissions.iter().collect();
    chronological.sort_by_key(|s| s.submitted_at);

    BADGES
        .iter()
        .map(|badge| {
            let unlocked_at = unlock_time(badge.condition, &chronological, streak, now);
            Achievement {
                id: badge.id.to_string(),
                name: badge.name.to_string(),
                description: badge.description.to_string(),
                icon: badge.icon.to_string(),
                unlocked: unlocked_at.is_some(),
                unlocked_at,
            }
        })
        .collect()
}

fn unlock_time(
    condition: Condition,
    chronological: &[&ChallengeSubmission],
    streak: Streak,
    now: DateTime<Utc>,
) -> Option<DateTime<Utc>> {
    match condition {
        Condition::Submissions(n) => chronological
            .get(n.checked_sub(1)?)
            .map(|s| s.submitted_at),
        Condition::PerfectScore => chronological
            .iter()
            .find(|s| s.is_perfect())
            .map(|s| s.submitted_at),
        Condition::SpeedRun => chronological
            .iter()
            .find(|s| s.time_spent < SPEED_RUN_SECONDS)
            .map(|s| s.submitted_at),
        Condition::CurrentStreak(days) => (streak.current >= days).then_some(now),
        Condition::AverageAtLeast {
            percent,
            min_submissions,
        } => (chronological.len() >= min_submissions
            && average_percentage(chronological.iter().copied()) >= f64::from(percent))
        .then_some(now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use sqlx::types::Json;

    fn submission(day: i64, correct: i64, time_spent: i64) -> ChallengeSubmission {
        partial(day, correct, 10, time_spent)
    }

    /// `answered` answers sent to a 10-question, 100-point challenge.
    fn partial(day: i64, correct: i64, answered: i64, time_spent: i64) -> ChallengeSubmission {
        ChallengeSubmission {
            id: day,
            challenge_id: day,
            user_id: 1,
            answers: Json(vec![]),
            score: correct * 10,
            max_score: 100,
            total_questions: answered,
            correct_answers: correct,
            time_spent,
            submitted_at: Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap() + Duration::days(day),
        }
    }

    fn find<'a>(achievements: &'a [Achievement], id: &str) -> &'a Achievement {
        achievements.iter().find(|a| a.id == id).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_empty_history_locks_everything() {
        let result = evaluate_achievements(&[], Streak::default(), now());
        assert_eq!(result.len(), BADGES.len());
        assert!(result.iter().all(|a| !a.unlocked && a.unlocked_at.is_none()));
    }

    #[test]
    fn test_first_challenge_uses_earliest_submission() {
        let subs = vec![submission(3, 5, 600), submission(1, 5, 600)];
        let result = evaluate_achievements(&subs, Streak::default(), now());

        let first = find(&result, "first_challenge");
        assert!(first.unlocked);
        assert_eq!(first.unlocked_at, Some(subs[1].submitted_at));
        assert!(!find(&result, "challenge_regular").unlocked);
    }

    #[test]
    fn test_tenth_submission_unlocks_regular() {
        let subs: Vec<_> = (0..10).map(|d| submission(d, 5, 600)).collect();
        let result = evaluate_achievements(&subs, Streak::default(), now());

        let regular = find(&result, "challenge_regular");
        assert!(regular.unlocked);
        assert_eq!(regular.unlocked_at, Some(subs[9].submitted_at));
    }

    #[test]
    fn test_perfect_and_speed_badges() {
        let subs = vec![submission(0, 9, 900), submission(1, 10, 400), submission(2, 4, 120)];
        let result = evaluate_achievements(&subs, Streak::default(), now());

        assert_eq!(find(&result, "perfect_score").unlocked_at, Some(subs[1].submitted_at));
        assert_eq!(find(&result, "speed_runner").unlocked_at, Some(subs[2].submitted_at));
    }

    #[test]
    fn test_all_correct_partial_answers_are_not_perfect() {
        let subs = vec![partial(0, 1, 1, 600), partial(1, 9, 9, 600)];
        let result = evaluate_achievements(&subs, Streak::default(), now());
        assert!(!find(&result, "perfect_score").unlocked);
    }

    #[test]
    fn test_average_counts_unanswered_questions() {
        let subs: Vec<_> = (0..5).map(|d| partial(d, 1, 1, 600)).collect();
        assert_eq!(average_percentage(&subs), 10.0);

        let result = evaluate_achievements(&subs, Streak::default(), now());
        assert!(!find(&result, "high_achiever").unlocked);
    }

    #[test]
    fn test_speed_threshold_is_strict() {
        let subs = vec![submission(0, 5, 300)];
        let result = evaluate_achievements(&subs, Streak::default(), now());
        assert!(!find(&result, "speed_runner").unlocked);
    }

    #[test]
    fn test_streak_badges_use_evaluation_time() {
        let subs = vec![submission(0, 5, 600)];
        let streak = Streak { current: 3, best: 5 };
        let result = evaluate_achievements(&subs, streak, now());

        assert_eq!(find(&result, "streak_3").unlocked_at, Some(now()));
        assert!(!find(&result, "streak_7").unlocked);
    }

    #[test]
    fn test_best_streak_alone_does_not_unlock() {
        let streak = Streak { current: 0, best: 10 };
        let result = evaluate_achievements(&[submission(0, 5, 600)], streak, now());
        assert!(!find(&result, "streak_3").unlocked);
    }

    #[test]
    fn test_high_achiever_needs_volume_and_average() {
        let strong: Vec<_> = (0..5).map(|d| submission(d, 8, 600)).collect();
        let result = evaluate_achievements(&strong, Streak::default(), now());
        assert_eq!(find(&result, "high_achiever").unlocked_at, Some(now()));

        let few: Vec<_> = (0..4).map(|d| submission(d, 10, 600)).collect();
        let result = evaluate_achievements(&few, Streak::default(), now());
        assert!(!find(&result, "high_achiever").unlocked);

        let weak: Vec<_> = (0..5).map(|d| submission(d, 7, 600)).collect();
        let result = evaluate_achievements(&weak, Streak::default(), now());
        assert!(!find(&result, "high_achiever").unlocked);
    }

    #[test]
    fn test_catalog_ids_are_unique() {
        let mut ids: Vec<_> = BADGES.iter().map(|b| b.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), BADGES.len());
    }
}
