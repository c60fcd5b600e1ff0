use thiserror::Error;

use crate::model::{LessonError, QuestionError, QuizSessionError, UserError};

/// Umbrella error for fallible domain construction, mainly useful where a
/// caller builds several model types in one go (catalog assembly, demo glue).
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    User(#[from] UserError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Lesson(#[from] LessonError),
    #[error(transparent)]
    QuizSession(#[from] QuizSessionError),
}
