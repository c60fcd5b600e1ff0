mod ids;
mod lesson;
mod question;
mod session;
mod user;

pub use ids::{BadgeId, LessonId, QuestionId, SectionId, SessionId, UserId};
pub use lesson::{Lesson, LessonError, SkillSection};
pub use question::{Difficulty, Question, QuestionError, QuestionKind};
pub use session::{QuizSession, QuizSessionError, QuizSessionPatch};
pub use user::{Badge, User, UserError};
