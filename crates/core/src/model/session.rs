use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::SessionId;
use crate::model::question::Question;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuizSessionError {
    #[error("quiz topic cannot be empty")]
    EmptyTopic,

    #[error("a quiz session needs at least one question")]
    NoQuestions,

    #[error("question index {index} out of bounds for {len} questions")]
    IndexOutOfBounds { index: usize, len: usize },

    #[error("completed_at is before started_at")]
    InvalidTimeRange,
}

/// A running quiz over a snapshot of questions.
///
/// The snapshot is owned: generated questions live only here, and lesson
/// questions are copied in so later catalog edits cannot shift a quiz under
/// the player. `current_index` always points at a real question; the only
/// exit past the last one is completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSession {
    id: SessionId,
    topic: String,
    questions: Vec<Question>,
    current_index: usize,
    score: u32,
    is_completed: bool,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Starts a fresh session at the first question with a zero score.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::EmptyTopic` if the topic is blank and
    /// `QuizSessionError::NoQuestions` if the snapshot is empty.
    pub fn new(
        topic: impl Into<String>,
        questions: Vec<Question>,
        started_at: DateTime<Utc>,
    ) -> Result<Self, QuizSessionError> {
        let topic = topic.into();
        if topic.trim().is_empty() {
            return Err(QuizSessionError::EmptyTopic);
        }
        if questions.is_empty() {
            return Err(QuizSessionError::NoQuestions);
        }

        Ok(Self {
            id: SessionId::generate(),
            topic: topic.trim().to_owned(),
            questions,
            current_index: 0,
            score: 0,
            is_completed: false,
            started_at,
            completed_at: None,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The question the player is currently on.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// True when the current question is the last in the snapshot.
    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.current_index + 1 == self.questions.len()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.is_completed
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Applies a partial update, all fields or none.
    ///
    /// Every patched field is validated before any is written, so a rejected
    /// patch leaves the session untouched.
    ///
    /// # Errors
    ///
    /// Returns `QuizSessionError::IndexOutOfBounds` if the patched index does
    /// not address a question, `QuizSessionError::InvalidTimeRange` if the
    /// patched completion time precedes the start.
    pub fn apply(&mut self, patch: QuizSessionPatch) -> Result<(), QuizSessionError> {
        if let Some(index) = patch.current_question_index {
            if index >= self.questions.len() {
                return Err(QuizSessionError::IndexOutOfBounds {
                    index,
                    len: self.questions.len(),
                });
            }
        }
        if let Some(completed_at) = patch.completed_at {
            if completed_at < self.started_at {
                return Err(QuizSessionError::InvalidTimeRange);
            }
        }

        if let Some(index) = patch.current_question_index {
            self.current_index = index;
        }
        if let Some(score) = patch.score {
            self.score = score;
        }
        if let Some(is_completed) = patch.is_completed {
            self.is_completed = is_completed;
        }
        if let Some(completed_at) = patch.completed_at {
            self.completed_at = Some(completed_at);
        }

        Ok(())
    }
}

/// Partial update for the active session; `None` fields are left alone.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct QuizSessionPatch {
    pub current_question_index: Option<usize>,
    pub score: Option<u32>,
    pub is_completed: Option<bool>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl QuizSessionPatch {
    /// Patch that marks the session finished at `completed_at`.
    #[must_use]
    pub fn completion(completed_at: DateTime<Utc>) -> Self {
        Self {
            is_completed: Some(true),
            completed_at: Some(completed_at),
            ..Self::default()
        }
    }
}
