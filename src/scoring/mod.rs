//! Pure scoring pipeline: grading, points, challenge aggregates, leaderboard
//! ranking, streaks and achievements. Nothing here touches storage.

pub mod achievements;
pub mod aggregate;
pub mod grader;
pub mod leaderboard;
pub mod score;
pub mod streak;
