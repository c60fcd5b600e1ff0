use thiserror::Error;

use crate::model::ids::{LessonId, SectionId};
use crate::model::question::{Difficulty, Question};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum LessonError {
    #[error("lesson id cannot be empty")]
    EmptyId,

    #[error("lesson title cannot be empty")]
    EmptyTitle,

    #[error("section title cannot be empty")]
    EmptySectionTitle,
}

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// A unit of course content in the skill tree.
///
/// Lessons are static data: prerequisites gate availability, the embedded
/// questions seed the lesson quiz, and the XP reward is paid once on first
/// completion. Completion state lives on the user, never here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    id: LessonId,
    title: String,
    description: String,
    topic: String,
    difficulty: Difficulty,
    xp_reward: u32,
    prerequisites: Vec<LessonId>,
    content: String,
    questions: Vec<Question>,
}

impl Lesson {
    /// Creates a new Lesson.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptyId` or `LessonError::EmptyTitle` when those
    /// fields are blank.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: LessonId,
        title: impl Into<String>,
        description: impl Into<String>,
        topic: impl Into<String>,
        difficulty: Difficulty,
        xp_reward: u32,
        prerequisites: Vec<LessonId>,
        content: impl Into<String>,
        questions: Vec<Question>,
    ) -> Result<Self, LessonError> {
        if id.as_str().trim().is_empty() {
            return Err(LessonError::EmptyId);
        }
        let title = title.into();
        if title.trim().is_empty() {
            return Err(LessonError::EmptyTitle);
        }

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            description: description.into(),
            topic: topic.into(),
            difficulty,
            xp_reward,
            prerequisites,
            content: content.into(),
            questions,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &LessonId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn xp_reward(&self) -> u32 {
        self.xp_reward
    }

    #[must_use]
    pub fn prerequisites(&self) -> &[LessonId] {
        &self.prerequisites
    }

    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }
}

//
// ─── SKILL SECTION ─────────────────────────────────────────────────────────────
//

/// A themed group of lessons in the skill tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillSection {
    id: SectionId,
    title: String,
    description: String,
    icon: String,
    lessons: Vec<Lesson>,
}

impl SkillSection {
    /// Creates a new SkillSection.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::EmptySectionTitle` if the title is blank.
    pub fn new(
        id: SectionId,
        title: impl Into<String>,
        description: impl Into<String>,
        icon: impl Into<String>,
        lessons: Vec<Lesson>,
    ) -> Result<Self, LessonError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(LessonError::EmptySectionTitle);
        }

        Ok(Self {
            id,
            title: title.trim().to_owned(),
            description: description.into(),
            icon: icon.into(),
            lessons,
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &SectionId {
        &self.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn icon(&self) -> &str {
        &self.icon
    }

    #[must_use]
    pub fn lessons(&self) -> &[Lesson] {
        &self.lessons
    }

    /// Looks up a lesson in this section by id.
    #[must_use]
    pub fn lesson(&self, id: &LessonId) -> Option<&Lesson> {
        self.lessons.iter().find(|lesson| lesson.id() == id)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
