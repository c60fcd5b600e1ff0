use std::sync::Arc;

use tracing::debug;

use providers::{GenerationError, QuestionSource};
use quest_core::model::{Question, QuizSession, QuizSessionError, SessionId};
use quest_core::{AppState, Clock};

use crate::error::GenerationServiceError;
use crate::flags;

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Starts generated quizzes: a quick topic path through the configured
/// question source, and a document path through the optional agent client.
///
/// Both paths drive the loading/error flags and install the session only
/// after the source resolves; a failed generation leaves user and quiz
/// untouched.
pub struct GenerationService {
    source: Arc<dyn QuestionSource>,
    agent: Option<Arc<dyn QuestionSource>>,
    clock: Clock,
}

impl GenerationService {
    #[must_use]
    pub fn new(source: Arc<dyn QuestionSource>) -> Self {
        Self {
            source,
            agent: None,
            clock: Clock::default(),
        }
    }

    /// Attach the agent-backed source for the document path.
    #[must_use]
    pub fn with_agent(mut self, agent: Arc<dyn QuestionSource>) -> Self {
        self.agent = Some(agent);
        self
    }

    /// Override the clock used to stamp session starts.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Whether the document path is configured.
    #[must_use]
    pub fn has_agent(&self) -> bool {
        self.agent.is_some()
    }

    /// Generate a topic quiz and install it as the active session.
    ///
    /// # Errors
    ///
    /// Rejects a blank topic before any flag changes; generation failures
    /// are recorded in the error flag and propagated.
    pub async fn quick_quiz(
        &self,
        state: &mut AppState,
        topic: &str,
    ) -> Result<SessionId, GenerationServiceError> {
        if topic.trim().is_empty() {
            return Err(QuizSessionError::EmptyTopic.into());
        }

        flags::begin(state);
        let questions = flags::settle(state, self.source.generate(topic, None).await)?;
        self.install(state, topic, questions)
    }

    /// Generate a quiz grounded in a reference document through the agent.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Disabled` (recorded in the error flag) when
    /// no agent is configured; otherwise behaves like [`Self::quick_quiz`].
    pub async fn document_quiz(
        &self,
        state: &mut AppState,
        topic: &str,
        document: &str,
    ) -> Result<SessionId, GenerationServiceError> {
        if topic.trim().is_empty() {
            return Err(QuizSessionError::EmptyTopic.into());
        }

        flags::begin(state);
        let outcome = match &self.agent {
            Some(agent) => agent.generate(topic, Some(document)).await,
            None => Err(GenerationError::Disabled),
        };
        let questions = flags::settle(state, outcome)?;
        self.install(state, topic, questions)
    }

    fn install(
        &self,
        state: &mut AppState,
        topic: &str,
        questions: Vec<Question>,
    ) -> Result<SessionId, GenerationServiceError> {
        let session = QuizSession::new(topic, questions, self.clock.now())?;
        let session_id = session.id().clone();
        debug!(topic, questions = session.question_count(), "generated quiz installed");
        state.start_quiz(session);
        Ok(session_id)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use providers::MockQuestionSource;
    use quest_core::time::fixed_clock;

    struct FailingSource;

    #[async_trait]
    impl QuestionSource for FailingSource {
        async fn generate(
            &self,
            _topic: &str,
            _document: Option<&str>,
        ) -> Result<Vec<Question>, GenerationError> {
            Err(GenerationError::EmptyResponse)
        }
    }

    fn build_service() -> GenerationService {
        GenerationService::new(Arc::new(MockQuestionSource::new())).with_clock(fixed_clock())
    }

    #[tokio::test]
    async fn quick_quiz_installs_the_generated_session() {
        let service = build_service();
        let mut state = AppState::new();

        let session_id = service.quick_quiz(&mut state, "Closures").await.unwrap();

        let quiz = state.quiz().unwrap();
        assert_eq!(quiz.id(), &session_id);
        assert_eq!(quiz.topic(), "Closures");
        assert_eq!(quiz.question_count(), 3);
        assert!(!state.is_loading());
        assert!(state.error().is_none());
    }

    #[tokio::test]
    async fn blank_topic_is_rejected_before_any_flag_changes() {
        let service = build_service();
        let mut state = AppState::new();

        let err = service.quick_quiz(&mut state, "   ").await.unwrap_err();

        assert!(matches!(
            err,
            GenerationServiceError::Session(QuizSessionError::EmptyTopic)
        ));
        assert!(!state.is_loading());
        assert!(state.error().is_none());
    }

    #[tokio::test]
    async fn failed_generation_sets_the_error_flag_and_installs_nothing() {
        let service =
            GenerationService::new(Arc::new(FailingSource)).with_clock(fixed_clock());
        let mut state = AppState::new();

        let err = service.quick_quiz(&mut state, "Closures").await.unwrap_err();

        assert!(matches!(
            err,
            GenerationServiceError::Generation(GenerationError::EmptyResponse)
        ));
        assert!(state.quiz().is_none());
        assert!(!state.is_loading());
        assert!(state.error().is_some());
    }

    #[tokio::test]
    async fn document_quiz_without_an_agent_is_disabled() {
        let service = build_service();
        let mut state = AppState::new();

        let err = service
            .document_quiz(&mut state, "Ownership", "Borrowing rules...")
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            GenerationServiceError::Generation(GenerationError::Disabled)
        ));
        assert_eq!(state.error(), Some("question generation is not configured"));
        assert!(state.quiz().is_none());
    }

    #[tokio::test]
    async fn document_quiz_uses_the_agent_when_configured() {
        let service = GenerationService::new(Arc::new(FailingSource))
            .with_agent(Arc::new(MockQuestionSource::new()))
            .with_clock(fixed_clock());
        let mut state = AppState::new();

        service
            .document_quiz(&mut state, "Ownership", "Borrowing rules...")
            .await
            .unwrap();

        assert_eq!(state.quiz().unwrap().topic(), "Ownership");
        assert_eq!(state.quiz().unwrap().question_count(), 3);
    }
}
