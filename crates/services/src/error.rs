//! Shared error types for the services crate.

use thiserror::Error;

use providers::{AuthError, GenerationError, GradingError};
use quest_core::model::{LessonId, QuizSessionError};

/// Errors emitted by `AuthService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthServiceError {
    #[error("email cannot be empty")]
    BlankEmail,
    #[error("password cannot be empty")]
    BlankPassword,
    #[error("name cannot be empty")]
    BlankName,
    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Errors emitted by `LessonService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LessonServiceError {
    #[error("unknown lesson {0}")]
    UnknownLesson(LessonId),
    #[error("lesson {0} is locked; complete its prerequisites first")]
    Locked(LessonId),
    #[error("no signed-in user")]
    NoUser,
    #[error("lesson {0} has no quiz questions")]
    NoQuestions(LessonId),
    #[error(transparent)]
    Catalog(#[from] quest_core::Error),
    #[error(transparent)]
    Session(#[from] QuizSessionError),
}

/// Errors emitted by `GenerationService`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerationServiceError {
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error(transparent)]
    Session(#[from] QuizSessionError),
}

/// Errors emitted by `QuizRunner`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QuizError {
    #[error("no active quiz session")]
    NoActiveSession,
    #[error("select an answer first")]
    NoAnswerSelected,
    #[error("this question already has feedback; retry or advance")]
    FeedbackPending,
    #[error("there is no feedback to act on; submit an answer first")]
    NotInFeedback,
    #[error("only a wrong answer can be retried")]
    NothingToRetry,
    #[error(transparent)]
    Grading(#[from] GradingError),
    #[error(transparent)]
    Session(#[from] QuizSessionError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Lesson(#[from] LessonServiceError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}
