//! Converts a correct-answer count into points.

/// Computes `round(points / number_of_questions * correct)`.
///
/// Returns `None` when the challenge has no questions, which is a broken
/// challenge rather than a scoring outcome. The result never exceeds `points`.
pub fn calculate_score(points: i64, number_of_questions: usize, correct: usize) -> Option<i64> {
    if number_of_questions == 0 {
        return None;
    }

    let per_question = points as f64 / number_of_questions as f64;
    // Scores are non-negative, so `round` (half away from zero) is half-up here.
    let score = (per_question * correct as f64).round() as i64;

    Some(score.clamp(0, points.max(0)))
}
