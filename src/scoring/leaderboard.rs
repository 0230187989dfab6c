//! Ranking of a challenge's submissions.

use std::cmp::Ordering;

use crate::{
    config::ANONYMOUS_NAME,
    models::submission::{LeaderboardEntry, LeaderboardRow, Medal},
};

/// Higher score first, then faster time, then earlier submission.
pub fn compare_rows(a: &LeaderboardRow, b: &LeaderboardRow) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| a.time_spent.cmp(&b.time_spent))
        .then_with(|| a.submitted_at.cmp(&b.submitted_at))
}

pub fn medal_for_rank(rank: usize) -> Option<Medal> {
    match rank {
        1 => Some(Medal::Gold),
        2 => Some(Medal::Silver),
        3 => Some(Medal::Bronze),
        _ => None,
    }
}

/// Sorts `rows`, keeps the first `limit`, and assigns 1-based ranks and medals.
pub fn rank_rows(mut rows: Vec<LeaderboardRow>, limit: usize) -> Vec<LeaderboardEntry> {
    rows.sort_by(compare_rows);
    rows.truncate(limit);

    rows.into_iter()
        .enumerate()
        .map(|(idx, row)| {
            let rank = idx + 1;
            LeaderboardEntry {
                rank,
                user_id: row.user_id,
                name: row.username.unwrap_or_else(|| ANONYMOUS_NAME.to_string()),
                email: row.email,
                score: row.score,
                correct_answers: row.correct_answers,
                total_questions: row.total_questions,
                time_spent: row.time_spent,
                submitted_at: row.submitted_at,
                badge: medal_for_rank(rank),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn row(user_id: i64, score: i64, time_spent: i64) -> LeaderboardRow {
        LeaderboardRow {
            user_id,
            score,
            time_spent,
            correct_answers: score / 10,
            total_questions: 10,
            submitted_at: Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            username: Some(format!("user{}", user_id)),
            email: Some(format!("user{}@example.com", user_id)),
        }
    }

    #[test]
    fn test_score_then_time_ordering() {
        let ranked = rank_rows(vec![row(1, 90, 120), row(2, 90, 100), row(3, 80, 50)], 100);

        let order: Vec<_> = ranked.iter().map(|e| (e.user_id, e.rank, e.badge)).collect();
        assert_eq!(
            order,
            vec![
                (2, 1, Some(Medal::Gold)),
                (1, 2, Some(Medal::Silver)),
                (3, 3, Some(Medal::Bronze)),
            ]
        );
    }

    #[test]
    fn test_fourth_place_has_no_medal() {
        let ranked = rank_rows(
            vec![row(1, 40, 1), row(2, 30, 1), row(3, 20, 1), row(4, 10, 1)],
            100,
        );
        assert_eq!(ranked[3].rank, 4);
        assert_eq!(ranked[3].badge, None);
    }

    #[test]
    fn test_full_tie_broken_by_submission_time() {
        let mut late = row(1, 50, 60);
        late.submitted_at += Duration::minutes(5);
        let early = row(2, 50, 60);

        let ranked = rank_rows(vec![late, early], 100);
        assert_eq!(ranked[0].user_id, 2);
    }

    #[test]
    fn test_capped_to_limit() {
        let rows = (0..150).map(|i| row(i, i, 10)).collect();
        let ranked = rank_rows(rows, 100);
        assert_eq!(ranked.len(), 100);
        assert_eq!(ranked[0].score, 149);
        assert_eq!(ranked[99].rank, 100);
    }

    #[test]
    fn test_missing_user_is_anonymous() {
        let mut orphan = row(9, 10, 10);
        orphan.username = None;
        orphan.email = None;

        let ranked = rank_rows(vec![orphan], 100);
        assert_eq!(ranked[0].name, "Anonymous");
        assert_eq!(ranked[0].email, None);
    }

    #[test]
    fn test_higher_score_always_ranks_above() {
        let rows = vec![
            row(1, 10, 5),
            row(2, 70, 500),
            row(3, 70, 20),
            row(4, 30, 1),
            row(5, 100, 999),
        ];
        let ranked = rank_rows(rows, 100);
        for pair in ranked.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.score > b.score || (a.score == b.score && a.time_spent <= b.time_spent));
        }
    }
}
