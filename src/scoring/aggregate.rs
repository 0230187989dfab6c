//! Challenge-wide aggregates recomputed after every submission.

/// Rounded mean of `score / points * 100` across all submissions.
///
/// Empty input, or a challenge without positive points, yields 0.
pub fn success_rate(points: i64, scores: &[i64]) -> i64 {
    if scores.is_empty() || points <= 0 {
        return 0;
    }

    let total: f64 = scores
        .iter()
        .map(|&score| score as f64 / points as f64 * 100.0)
        .sum();
    let mean = total / scores.len() as f64;

    (mean.round() as i64).clamp(0, 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_zero() {
        assert_eq!(success_rate(100, &[]), 0);
    }

    #[test]
    fn test_single_submission() {
        assert_eq!(success_rate(100, &[70]), 70);
    }

    #[test]
    fn test_mean_of_percentages() {
        // 50%, 100%, 25% -> 58.33
        assert_eq!(success_rate(40, &[20, 40, 10]), 58);
    }

    #[test]
    fn test_rounding() {
        // 50% and 75% -> 62.5
        assert_eq!(success_rate(4, &[2, 3]), 63);
    }

    #[test]
    fn test_bounded() {
        assert_eq!(success_rate(10, &[10, 10, 10]), 100);
        assert_eq!(success_rate(10, &[0, 0]), 0);
        assert_eq!(success_rate(0, &[5]), 0);
        assert_eq!(success_rate(10, &[25]), 100);
    }
}
