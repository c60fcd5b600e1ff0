#![forbid(unsafe_code)]

pub mod app_services;
pub mod auth_service;
pub mod error;
mod flags;
pub mod generation_service;
pub mod lesson_service;
pub mod quiz_service;

pub use quest_core::Clock;

pub use error::{
    AppServicesError, AuthServiceError, GenerationServiceError, LessonServiceError, QuizError,
};

pub use app_services::AppServices;
pub use auth_service::AuthService;
pub use generation_service::GenerationService;
pub use lesson_service::{LessonCompletion, LessonService};
pub use quiz_service::{QuizAdvance, QuizPhase, QuizRunner, QuizSummary};
