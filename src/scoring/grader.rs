//! Grades a submitted answer set against a challenge's answer key.

use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use uuid::Uuid;

use crate::{
    error::AppError,
    models::{
        challenge::Question,
        submission::{SubmissionAnswer, SubmittedAnswer},
    },
};

/// Why a submission could not be graded. Grading is all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GradeError {
    UnknownQuestion(Uuid),
    DuplicateAnswer(Uuid),
}

impl fmt::Display for GradeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GradeError::UnknownQuestion(id) => write!(f, "Question {} not found in challenge", id),
            GradeError::DuplicateAnswer(id) => {
                write!(f, "Question {} was answered more than once", id)
            }
        }
    }
}

impl std::error::Error for GradeError {}

impl From<GradeError> for AppError {
    fn from(err: GradeError) -> Self {
        match err {
            GradeError::UnknownQuestion(_) => AppError::NotFound(err.to_string()),
            GradeError::DuplicateAnswer(_) => AppError::BadRequest(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradedAnswers {
    /// One record per submitted answer, in submission order.
    pub answers: Vec<SubmissionAnswer>,
    pub correct: usize,
}

/// Grades every submitted answer by exact string match.
///
/// Fails on the first answer that references a question outside `questions`
/// or repeats a question already answered, so nothing is ever partially graded.
pub fn grade_answers(
    questions: &[Question],
    submitted: &[SubmittedAnswer],
) -> Result<GradedAnswers, GradeError> {
    let key: HashMap<Uuid, &Question> = questions.iter().map(|q| (q.id, q)).collect();
    let mut seen = HashSet::with_capacity(submitted.len());
    let mut answers = Vec::with_capacity(submitted.len());
    let mut correct = 0;

    for sub in submitted {
        let question = key
            .get(&sub.question_id)
            .ok_or(GradeError::UnknownQuestion(sub.question_id))?;

        if !seen.insert(sub.question_id) {
            return Err(GradeError::DuplicateAnswer(sub.question_id));
        }

        let is_correct = sub.answer == question.answer;
        if is_correct {
            correct += 1;
        }

        answers.push(SubmissionAnswer {
            question_id: question.id,
            question: question.question.clone(),
            options: question.options.clone(),
            explanation: question.explanation.clone(),
            user_answer: sub.answer.clone(),
            correct_answer: question.answer.clone(),
            is_correct,
        });
    }

    Ok(GradedAnswers { answers, correct })
}
