use std::sync::Arc;

use tracing::debug;

use providers::{
    AgentClient, AgentConfig, AnswerGrader, AuthProvider, ExactMatchGrader, InMemoryAuthProvider,
    MockQuestionSource,
};
use quest_core::Clock;

use crate::auth_service::AuthService;
use crate::error::AppServicesError;
use crate::generation_service::GenerationService;
use crate::lesson_service::LessonService;
use crate::quiz_service::QuizRunner;

/// Assembles the services over shared providers.
///
/// Deliberately does not own `AppState`: whoever runs the event loop holds
/// the one store and passes it into each call.
pub struct AppServices {
    auth: AuthService,
    lessons: LessonService,
    generation: GenerationService,
    grader: Arc<dyn AnswerGrader>,
    clock: Clock,
}

impl AppServices {
    /// Wire the default providers: in-memory auth, the mock topic source,
    /// the exact-match grader, and the agent client when the environment
    /// configures one.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if catalog construction or agent
    /// configuration fails.
    pub fn new() -> Result<Self, AppServicesError> {
        Self::with_clock(Clock::default())
    }

    /// Same wiring on a caller-supplied clock.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if catalog construction or agent
    /// configuration fails.
    pub fn with_clock(clock: Clock) -> Result<Self, AppServicesError> {
        let auth_provider: Arc<dyn AuthProvider> =
            Arc::new(InMemoryAuthProvider::with_clock(clock));

        let mut generation =
            GenerationService::new(Arc::new(MockQuestionSource::new())).with_clock(clock);
        if let Some(config) = AgentConfig::from_env()? {
            debug!(base_url = %config.base_url, "agent question source configured");
            generation = generation.with_agent(Arc::new(AgentClient::new(config)?));
        }

        Ok(Self {
            auth: AuthService::new(auth_provider),
            lessons: LessonService::new()?.with_clock(clock),
            generation,
            grader: Arc::new(ExactMatchGrader::new()),
            clock,
        })
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }

    #[must_use]
    pub fn lessons(&self) -> &LessonService {
        &self.lessons
    }

    #[must_use]
    pub fn generation(&self) -> &GenerationService {
        &self.generation
    }

    /// A fresh runner for one quiz session.
    #[must_use]
    pub fn quiz_runner(&self) -> QuizRunner {
        QuizRunner::new(Arc::clone(&self.grader)).with_clock(self.clock)
    }
}
