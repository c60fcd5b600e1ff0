use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use providers::{AnswerFeedback, AnswerGrader};
use quest_core::model::{QuizSessionPatch, SessionId};
use quest_core::{AppState, Clock};

use crate::error::QuizError;

//
// ─── PHASES ────────────────────────────────────────────────────────────────────
//

/// Where the runner stands on the current question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuizPhase {
    /// Waiting for the caller to submit an answer.
    Answering,
    /// Holding the grading outcome until the caller retries or advances.
    Feedback(AnswerFeedback),
}

/// What advancing past a graded question produced.
#[derive(Debug, Clone, PartialEq)]
pub enum QuizAdvance {
    /// Moved to the next question.
    Next { index: usize },
    /// That was the last question; the session is finished and has been
    /// cleared from the store.
    Completed(QuizSummary),
}

/// Completion summary of a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    pub session_id: SessionId,
    pub topic: String,
    pub score: u32,
    pub questions: usize,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

//
// ─── RUNNER ────────────────────────────────────────────────────────────────────
//

/// Drives one quiz session from the first answer to completion.
///
/// The runner holds only phase: the session itself lives in the store, and
/// every mutation goes through the store's validated patch. A caller keeps
/// one runner per session and drops it afterwards.
///
/// Grading awards are flat per outcome: a correct answer adds the grader's
/// reward to both the user's XP and the session score, a wrong answer adds
/// nothing anywhere (its consolation value is only reported). The questions'
/// own XP values play no part here.
pub struct QuizRunner {
    grader: Arc<dyn AnswerGrader>,
    clock: Clock,
    phase: QuizPhase,
}

impl QuizRunner {
    #[must_use]
    pub fn new(grader: Arc<dyn AnswerGrader>) -> Self {
        Self {
            grader,
            clock: Clock::default(),
            phase: QuizPhase::Answering,
        }
    }

    /// Override the clock used to stamp completion.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn phase(&self) -> &QuizPhase {
        &self.phase
    }

    /// The grading outcome for the current question, if one is pending.
    #[must_use]
    pub fn feedback(&self) -> Option<&AnswerFeedback> {
        match &self.phase {
            QuizPhase::Feedback(feedback) => Some(feedback),
            QuizPhase::Answering => None,
        }
    }

    /// Grade the selected answer against the current question.
    ///
    /// On a correct answer the grader's reward lands in both the user's XP
    /// and the session score; on a wrong answer nothing is applied. Either
    /// way the runner moves to `Feedback` holding the outcome.
    ///
    /// # Errors
    ///
    /// Rejects a blank selection (`NoAnswerSelected`), a second submission
    /// for the same question (`FeedbackPending`), and a missing session
    /// (`NoActiveSession`); all with no state change. Grading failures
    /// propagate without touching store or phase.
    pub async fn submit_answer(
        &mut self,
        state: &mut AppState,
        selected: &str,
    ) -> Result<AnswerFeedback, QuizError> {
        if selected.trim().is_empty() {
            return Err(QuizError::NoAnswerSelected);
        }
        if matches!(self.phase, QuizPhase::Feedback(_)) {
            return Err(QuizError::FeedbackPending);
        }

        // Snapshot what grading needs so the store is not borrowed across
        // the await.
        let (question_id, correct, score) = {
            let session = state.quiz().ok_or(QuizError::NoActiveSession)?;
            let question = session.current_question().ok_or(QuizError::NoActiveSession)?;
            (
                question.id().clone(),
                question.correct_answer().to_string(),
                session.score(),
            )
        };

        let feedback = self
            .grader
            .submit_answer(&question_id, selected, &correct)
            .await?;

        if feedback.is_correct {
            state.add_xp(feedback.xp_earned);
            state.update_quiz(QuizSessionPatch {
                score: Some(score.saturating_add(feedback.xp_earned)),
                ..QuizSessionPatch::default()
            })?;
        }

        self.phase = QuizPhase::Feedback(feedback.clone());
        Ok(feedback)
    }

    /// Return to `Answering` on the same question after a wrong answer.
    ///
    /// # Errors
    ///
    /// Returns `NotInFeedback` before any submission and `NothingToRetry`
    /// after a correct one.
    pub fn retry(&mut self) -> Result<(), QuizError> {
        match &self.phase {
            QuizPhase::Feedback(feedback) if !feedback.is_correct => {
                self.phase = QuizPhase::Answering;
                Ok(())
            }
            QuizPhase::Feedback(_) => Err(QuizError::NothingToRetry),
            QuizPhase::Answering => Err(QuizError::NotInFeedback),
        }
    }

    /// Leave the current question's feedback: step to the next question, or
    /// complete and clear the session when it was the last one.
    ///
    /// # Errors
    ///
    /// Returns `NotInFeedback` before any submission and `NoActiveSession`
    /// when the store holds no session.
    pub fn advance(&mut self, state: &mut AppState) -> Result<QuizAdvance, QuizError> {
        if !matches!(self.phase, QuizPhase::Feedback(_)) {
            return Err(QuizError::NotInFeedback);
        }

        let (index, is_last) = {
            let session = state.quiz().ok_or(QuizError::NoActiveSession)?;
            (session.current_index(), session.is_last_question())
        };

        if !is_last {
            let next = index + 1;
            state.update_quiz(QuizSessionPatch {
                current_question_index: Some(next),
                ..QuizSessionPatch::default()
            })?;
            self.phase = QuizPhase::Answering;
            return Ok(QuizAdvance::Next { index: next });
        }

        let completed_at = self.clock.now();
        state.update_quiz(QuizSessionPatch::completion(completed_at))?;
        let session = state.end_quiz().ok_or(QuizError::NoActiveSession)?;
        self.phase = QuizPhase::Answering;

        let summary = QuizSummary {
            session_id: session.id().clone(),
            topic: session.topic().to_string(),
            score: session.score(),
            questions: session.question_count(),
            started_at: session.started_at(),
            completed_at,
        };
        debug!(topic = %summary.topic, score = summary.score, "quiz completed");
        Ok(QuizAdvance::Completed(summary))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use providers::ExactMatchGrader;
    use quest_core::model::{
        Difficulty, Question, QuestionId, QuestionKind, QuizSession, User, UserId,
    };
    use quest_core::time::{fixed_clock, fixed_now};

    fn build_question(id: &str, correct: &str) -> Question {
        Question::new(
            QuestionId::new(id),
            QuestionKind::MultipleChoice,
            "Which keyword declares a constant?",
            vec!["const".into(), "var".into()],
            correct,
            "",
            40,
            Difficulty::Beginner,
            "Testing",
        )
        .unwrap()
    }

    fn build_state(questions: usize) -> AppState {
        let mut state = AppState::new();
        let user = User::fresh(UserId::new("u-1"), "dev@example.com", "Dev", fixed_now()).unwrap();
        state.set_user(Some(user));

        let questions = (1..=questions)
            .map(|n| build_question(&format!("q-{n}"), "const"))
            .collect();
        let session = QuizSession::new("Testing", questions, fixed_now()).unwrap();
        state.start_quiz(session);
        state
    }

    fn build_runner() -> QuizRunner {
        QuizRunner::new(Arc::new(ExactMatchGrader::new())).with_clock(fixed_clock())
    }

    #[tokio::test]
    async fn correct_answer_adds_the_same_reward_to_xp_and_score() {
        let mut state = build_state(2);
        let mut runner = build_runner();

        let feedback = runner.submit_answer(&mut state, "const").await.unwrap();

        assert!(feedback.is_correct);
        assert_eq!(state.user().unwrap().xp(), 50);
        assert_eq!(state.quiz().unwrap().score(), 50);
        assert!(matches!(runner.phase(), QuizPhase::Feedback(_)));
    }

    #[tokio::test]
    async fn wrong_answer_applies_nothing() {
        let mut state = build_state(2);
        let mut runner = build_runner();

        let feedback = runner.submit_answer(&mut state, "var").await.unwrap();

        assert!(!feedback.is_correct);
        assert_eq!(feedback.xp_earned, 10); // reported, never applied
        assert_eq!(state.user().unwrap().xp(), 0);
        assert_eq!(state.quiz().unwrap().score(), 0);
    }

    #[tokio::test]
    async fn blank_selection_is_rejected_without_state_change() {
        let mut state = build_state(1);
        let mut runner = build_runner();

        let err = runner.submit_answer(&mut state, "  ").await.unwrap_err();

        assert!(matches!(err, QuizError::NoAnswerSelected));
        assert_eq!(runner.phase(), &QuizPhase::Answering);
        assert_eq!(state.quiz().unwrap().score(), 0);
    }

    #[tokio::test]
    async fn a_second_submission_must_wait_for_advance_or_retry() {
        let mut state = build_state(2);
        let mut runner = build_runner();
        runner.submit_answer(&mut state, "const").await.unwrap();

        let err = runner.submit_answer(&mut state, "const").await.unwrap_err();
        assert!(matches!(err, QuizError::FeedbackPending));
        // the first award must not double up
        assert_eq!(state.user().unwrap().xp(), 50);
    }

    #[tokio::test]
    async fn submitting_without_a_session_is_rejected() {
        let mut state = AppState::new();
        let mut runner = build_runner();

        let err = runner.submit_answer(&mut state, "const").await.unwrap_err();
        assert!(matches!(err, QuizError::NoActiveSession));
    }

    #[tokio::test]
    async fn retry_is_only_for_wrong_answers() {
        let mut state = build_state(2);
        let mut runner = build_runner();

        assert!(matches!(runner.retry(), Err(QuizError::NotInFeedback)));

        runner.submit_answer(&mut state, "const").await.unwrap();
        assert!(matches!(runner.retry(), Err(QuizError::NothingToRetry)));
    }

    #[tokio::test]
    async fn retry_returns_to_the_same_question() {
        let mut state = build_state(2);
        let mut runner = build_runner();
        runner.submit_answer(&mut state, "var").await.unwrap();

        runner.retry().unwrap();

        assert_eq!(runner.phase(), &QuizPhase::Answering);
        assert_eq!(state.quiz().unwrap().current_index(), 0);

        // the question can now be answered correctly
        let feedback = runner.submit_answer(&mut state, "const").await.unwrap();
        assert!(feedback.is_correct);
        assert_eq!(state.quiz().unwrap().score(), 50);
    }

    #[tokio::test]
    async fn advance_steps_through_and_completes_the_session() {
        let mut state = build_state(2);
        let mut runner = build_runner();

        runner.submit_answer(&mut state, "const").await.unwrap();
        let step = runner.advance(&mut state).unwrap();
        assert_eq!(step, QuizAdvance::Next { index: 1 });
        assert_eq!(state.quiz().unwrap().current_index(), 1);

        runner.submit_answer(&mut state, "var").await.unwrap();
        let step = runner.advance(&mut state).unwrap();

        let QuizAdvance::Completed(summary) = step else {
            panic!("expected completion");
        };
        assert_eq!(summary.topic, "Testing");
        assert_eq!(summary.score, 50);
        assert_eq!(summary.questions, 2);
        assert_eq!(summary.completed_at, fixed_now());
        assert!(state.quiz().is_none());
    }

    #[tokio::test]
    async fn advance_requires_feedback() {
        let mut state = build_state(1);
        let mut runner = build_runner();

        let err = runner.advance(&mut state).unwrap_err();
        assert!(matches!(err, QuizError::NotInFeedback));
        assert!(state.quiz().is_some());
    }
}
