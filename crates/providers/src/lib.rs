#![forbid(unsafe_code)]

pub mod auth;
pub mod grading;
pub mod questions;

pub use auth::{AuthError, AuthProvider, AuthSession, InMemoryAuthProvider, MIN_PASSWORD_LEN};
pub use grading::{AnswerFeedback, AnswerGrader, ExactMatchGrader, GradingError};
pub use questions::{
    AgentClient, AgentConfig, GenerationError, MockQuestionSource, QuestionSource,
};
