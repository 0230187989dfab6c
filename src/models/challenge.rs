// src/models/challenge.rs

use std::{collections::HashSet, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::{error::AppError, utils::html::clean_html};

/// How often a challenge recurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Daily,
    Weekly,
}

impl Category {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Category::Daily => "daily",
            Category::Weekly => "weekly",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "daily" => Ok(Category::Daily),
            "weekly" => Ok(Category::Weekly),
            other => Err(format!("unknown category '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Easy" => Ok(Difficulty::Easy),
            "Medium" => Ok(Difficulty::Medium),
            "Hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty '{}'", other)),
        }
    }
}

/// Publication state. Draft challenges are only visible to their authors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChallengeStatus {
    Published,
    #[default]
    Draft,
}

impl ChallengeStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ChallengeStatus::Published => "Published",
            ChallengeStatus::Draft => "Draft",
        }
    }
}

impl FromStr for ChallengeStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Published" => Ok(ChallengeStatus::Published),
            "Draft" => Ok(ChallengeStatus::Draft),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// A multiple-choice question embedded in a challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: Uuid,

    /// The text of the question.
    pub question: String,

    /// Ordered list of options shown to the user.
    pub options: Vec<String>,

    /// The correct option, compared by exact string equality.
    pub answer: String,

    pub explanation: Option<String>,
}

/// A timed set of questions worth an aggregate number of points.
#[derive(Debug, Clone, Serialize)]
pub struct Challenge {
    pub id: i64,
    pub title: String,
    pub category: Category,
    pub difficulty: Difficulty,

    /// Total achievable points, spread evenly across the questions.
    pub points: i64,

    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub questions: Vec<Question>,
    pub status: ChallengeStatus,

    /// Author of the challenge. `None` once the author account is deleted.
    pub created_by: Option<i64>,

    /// Number of submissions received.
    pub attempts: i64,

    /// Rounded mean percentage across all submissions (0-100).
    pub success_rate: i64,

    pub created_at: DateTime<Utc>,
}

impl Challenge {
    pub fn number_of_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn is_published(&self) -> bool {
        self.status == ChallengeStatus::Published
    }

    /// Strips the answer key for users who are about to attempt it.
    pub fn to_public(&self) -> PublicChallenge {
        PublicChallenge {
            id: self.id,
            title: self.title.clone(),
            category: self.category,
            difficulty: self.difficulty,
            points: self.points,
            description: self.description.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            questions: self
                .questions
                .iter()
                .map(|q| PublicQuestion {
                    id: q.id,
                    question: q.question.clone(),
                    options: q.options.clone(),
                })
                .collect(),
            attempts: self.attempts,
            success_rate: self.success_rate,
        }
    }

    pub fn to_summary(&self) -> ChallengeSummary {
        ChallengeSummary {
            id: self.id,
            title: self.title.clone(),
            category: self.category,
            difficulty: self.difficulty,
            points: self.points,
            start_time: self.start_time,
            end_time: self.end_time,
            number_of_questions: self.questions.len(),
            status: self.status,
            attempts: self.attempts,
            success_rate: self.success_rate,
        }
    }
}

/// DTO for sending question to client (excludes answer and explanation).
#[derive(Debug, Serialize, Deserialize)]
pub struct PublicQuestion {
    pub id: Uuid,
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicChallenge {
    pub id: i64,
    pub title: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub points: i64,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub questions: Vec<PublicQuestion>,
    pub attempts: i64,
    pub success_rate: i64,
}

/// List item for the challenge index.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChallengeSummary {
    pub id: i64,
    pub title: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub points: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub number_of_questions: usize,
    pub status: ChallengeStatus,
    pub attempts: i64,
    pub success_rate: i64,
}

/// Insert payload handed to the store.
#[derive(Debug, Clone)]
pub struct NewChallenge {
    pub title: String,
    pub category: Category,
    pub difficulty: Difficulty,
    pub points: i64,
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub questions: Vec<Question>,
    pub status: ChallengeStatus,
    pub created_by: Option<i64>,
}

/// Query parameters for listing challenges.
#[derive(Debug, Default, Deserialize)]
pub struct ChallengeListParams {
    pub category: Option<Category>,
}

/// Filter handed to the store.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChallengeFilter {
    pub category: Option<Category>,
    pub status: Option<ChallengeStatus>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: ChallengeStatus,
}

/// DTO for a question inside a new challenge.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 1000))]
    pub question: String,
    #[validate(custom(function = validate_options))]
    pub options: Vec<String>,
    #[validate(length(min = 1, max = 500))]
    pub answer: String,
    #[validate(length(max = 2000))]
    pub explanation: Option<String>,
}

/// DTO for creating a new challenge.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateChallengeRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub category: Category,
    pub difficulty: Difficulty,
    #[validate(range(min = 1, max = 100_000))]
    pub points: i64,
    #[validate(length(max = 5000))]
    pub description: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    #[validate(nested)]
    pub questions: Vec<CreateQuestionRequest>,
    #[serde(default)]
    pub status: ChallengeStatus,
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.len() < 2 {
        return Err(validator::ValidationError::new("options_need_at_least_two"));
    }
    for opt in options {
        if opt.is_empty() {
            return Err(validator::ValidationError::new("option_cannot_be_empty"));
        }
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

/// Cross-field rules a challenge must satisfy for its scores to be meaningful.
/// `question` fields are 1-based positions in the submitted list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChallengeRuleViolation {
    NoQuestions,
    AnswerNotInOptions { question: usize },
    DuplicateOptions { question: usize },
    PointsNotDivisible { points: i64, questions: usize },
    EndsBeforeStart,
}

impl fmt::Display for ChallengeRuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoQuestions => write!(f, "A challenge needs at least one question"),
            Self::AnswerNotInOptions { question } => {
                write!(f, "Question {} has an answer that is not one of its options", question)
            }
            Self::DuplicateOptions { question } => {
                write!(f, "Question {} lists the same option more than once", question)
            }
            Self::PointsNotDivisible { points, questions } => write!(
                f,
                "{} points cannot be split evenly across {} questions",
                points, questions
            ),
            Self::EndsBeforeStart => write!(f, "Challenge must end after it starts"),
        }
    }
}

impl From<ChallengeRuleViolation> for AppError {
    fn from(violation: ChallengeRuleViolation) -> Self {
        AppError::BadRequest(violation.to_string())
    }
}

impl CreateChallengeRequest {
    /// Checks the rules the field validators cannot express.
    pub fn check_rules(&self) -> Result<(), ChallengeRuleViolation> {
        if self.questions.is_empty() {
            return Err(ChallengeRuleViolation::NoQuestions);
        }

        for (idx, q) in self.questions.iter().enumerate() {
            let mut seen = HashSet::new();
            if !q.options.iter().all(|opt| seen.insert(opt.as_str())) {
                return Err(ChallengeRuleViolation::DuplicateOptions { question: idx + 1 });
            }
            if !q.options.contains(&q.answer) {
                return Err(ChallengeRuleViolation::AnswerNotInOptions { question: idx + 1 });
            }
        }

        let questions = self.questions.len();
        if self.points % questions as i64 != 0 {
            return Err(ChallengeRuleViolation::PointsNotDivisible {
                points: self.points,
                questions,
            });
        }

        if self.end_time <= self.start_time {
            return Err(ChallengeRuleViolation::EndsBeforeStart);
        }

        Ok(())
    }

    /// Runs field validation followed by the cross-field rules.
    pub fn validate_all(&self) -> Result<(), AppError> {
        self.validate()?;
        self.check_rules()?;
        Ok(())
    }

    /// Assigns question ids and sanitizes free text.
    pub fn into_new_challenge(self, created_by: i64) -> NewChallenge {
        let questions = self
            .questions
            .into_iter()
            .map(|q| Question {
                id: Uuid::new_v4(),
                question: q.question,
                options: q.options,
                answer: q.answer,
                explanation: q.explanation.map(|e| clean_html(&e)),
            })
            .collect();

        NewChallenge {
            title: self.title,
            category: self.category,
            difficulty: self.difficulty,
            points: self.points,
            description: clean_html(&self.description),
            start_time: self.start_time,
            end_time: self.end_time,
            questions,
            status: self.status,
            created_by: Some(created_by),
        }
    }
}
