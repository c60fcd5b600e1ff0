use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use quest_core::model::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors surfaced by answer graders.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GradingError {
    #[error("grading backend error: {0}")]
    Backend(String),
}

//
// ─── GRADER ────────────────────────────────────────────────────────────────────
//

/// Outcome of grading one submitted answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerFeedback {
    pub is_correct: bool,
    pub feedback: String,
    pub xp_earned: u32,
}

/// Contract for grading a submitted answer against the canonical one.
#[async_trait]
pub trait AnswerGrader: Send + Sync {
    /// Grade a submission.
    ///
    /// # Errors
    ///
    /// Returns `GradingError` when the grader cannot produce a verdict.
    async fn submit_answer(
        &self,
        question_id: &QuestionId,
        selected: &str,
        correct: &str,
    ) -> Result<AnswerFeedback, GradingError>;
}

//
// ─── EXACT MATCH ───────────────────────────────────────────────────────────────
//

const XP_CORRECT: u32 = 50;
const XP_INCORRECT: u32 = 10;

/// Grader that compares the submission to the canonical answer byte for
/// byte. No trimming, no case folding: option text is selected verbatim in
/// the client, so anything else would paper over data bugs.
///
/// Rewards are flat per outcome, not per question: 50 XP for a correct
/// answer, a consolation 10 for a wrong one (reported, and up to the caller
/// to apply or ignore).
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactMatchGrader;

impl ExactMatchGrader {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl AnswerGrader for ExactMatchGrader {
    async fn submit_answer(
        &self,
        question_id: &QuestionId,
        selected: &str,
        correct: &str,
    ) -> Result<AnswerFeedback, GradingError> {
        let is_correct = selected == correct;
        debug!(question = %question_id, is_correct, "answer graded");

        let feedback = if is_correct {
            "Excellent! Your answer is correct.".to_string()
        } else {
            format!("Not quite. The correct answer is: \"{correct}\". Review the concept and try again.")
        };

        Ok(AnswerFeedback {
            is_correct,
            feedback,
            xp_earned: if is_correct { XP_CORRECT } else { XP_INCORRECT },
        })
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
