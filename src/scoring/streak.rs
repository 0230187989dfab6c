//! Consecutive-day streaks derived from submission timestamps.
//!
//! Days are UTC calendar dates. Streaks are never stored because the current
//! streak depends on today's date.

use std::collections::BTreeSet;

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    /// Run of active days ending today. Zero when today has no activity.
    pub current: u32,
    /// Longest run of active days anywhere in the history.
    pub best: u32,
}

/// Distinct UTC dates with at least one submission, ascending.
pub fn active_days(timestamps: &[DateTime<Utc>]) -> BTreeSet<NaiveDate> {
    timestamps.iter().map(|ts| ts.date_naive()).collect()
}

pub fn calculate_streak(timestamps: &[DateTime<Utc>], today: NaiveDate) -> Streak {
    let days = active_days(timestamps);

    Streak {
        current: current_streak(&days, today),
        best: best_streak(&days),
    }
}

fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let mut streak = 0;
    let mut day = Some(today);

    while let Some(d) = day {
        if !days.contains(&d) {
            break;
        }
        streak += 1;
        day = d.checked_sub_days(Days::new(1));
    }

    streak
}

fn best_streak(days: &BTreeSet<NaiveDate>) -> u32 {
    let mut best = 0;
    let mut run = 0;
    let mut prev: Option<NaiveDate> = None;

    for &day in days {
        run = match prev {
            Some(p) if p.succ_opt() == Some(day) => run + 1,
            _ => 1,
        };
        best = best.max(run);
        prev = Some(day);
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_empty_history() {
        assert_eq!(calculate_streak(&[], date(2024, 1, 3)), Streak::default());
    }

    #[test]
    fn test_three_days_ending_today() {
        let ts = [at(2024, 1, 1, 9), at(2024, 1, 2, 9), at(2024, 1, 3, 9)];
        let streak = calculate_streak(&ts, date(2024, 1, 3));
        assert_eq!(streak, Streak { current: 3, best: 3 });
    }

    #[test]
    fn test_no_activity_today_breaks_current() {
        let ts = [at(2024, 1, 1, 9), at(2024, 1, 2, 9), at(2024, 1, 3, 9)];
        let streak = calculate_streak(&ts, date(2024, 1, 4));
        assert_eq!(streak, Streak { current: 0, best: 3 });
    }

    #[test]
    fn test_multiple_submissions_same_day_count_once() {
        let ts = [at(2024, 1, 3, 1), at(2024, 1, 3, 12), at(2024, 1, 3, 23)];
        let streak = calculate_streak(&ts, date(2024, 1, 3));
        assert_eq!(streak, Streak { current: 1, best: 1 });
    }

    #[test]
    fn test_gap_resets_best_run() {
        let ts = [
            at(2024, 1, 1, 9),
            at(2024, 1, 2, 9),
            at(2024, 1, 3, 9),
            at(2024, 1, 4, 9),
            at(2024, 1, 10, 9),
            at(2024, 1, 11, 9),
        ];
        let streak = calculate_streak(&ts, date(2024, 1, 11));
        assert_eq!(streak, Streak { current: 2, best: 4 });
    }

    #[test]
    fn test_month_and_year_boundaries() {
        let ts = [at(2023, 12, 30, 9), at(2023, 12, 31, 9), at(2024, 1, 1, 9), at(2024, 3, 1, 0)];
        let streak = calculate_streak(&ts, date(2024, 1, 1));
        assert_eq!(streak, Streak { current: 3, best: 3 });

        // 2024 is a leap year
        let ts = [at(2024, 2, 28, 9), at(2024, 2, 29, 9), at(2024, 3, 1, 9)];
        assert_eq!(calculate_streak(&ts, date(2024, 3, 1)).current, 3);
    }

    #[test]
    fn test_utc_date_is_used() {
        // 23:59 and 00:01 UTC are different days
        let ts = [
            Utc.with_ymd_and_hms(2024, 5, 1, 23, 59, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 5, 2, 0, 1, 0).unwrap(),
        ];
        assert_eq!(calculate_streak(&ts, date(2024, 5, 2)).current, 2);
    }

    #[test]
    fn test_unsorted_input() {
        let ts = [at(2024, 1, 3, 9), at(2024, 1, 1, 9), at(2024, 1, 2, 9)];
        assert_eq!(calculate_streak(&ts, date(2024, 1, 3)).best, 3);
    }

    #[test]
    fn test_best_is_never_below_current() {
        let histories: [&[DateTime<Utc>]; 3] = [
            &[at(2024, 1, 1, 9)],
            &[at(2024, 1, 1, 9), at(2024, 1, 5, 9), at(2024, 1, 6, 9)],
            &[at(2024, 1, 4, 9), at(2024, 1, 5, 9), at(2024, 1, 6, 9)],
        ];
        for ts in histories {
            let streak = calculate_streak(ts, date(2024, 1, 6));
            assert!(streak.best >= streak.current);
        }
    }
}
