use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::model::ids::QuestionId;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt cannot be empty")]
    EmptyPrompt,

    #[error("question correct answer cannot be empty")]
    EmptyCorrectAnswer,

    #[error("unknown question kind: {0}")]
    UnknownKind(String),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── KIND AND DIFFICULTY ───────────────────────────────────────────────────────
//

/// The exercise format of a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    MultipleChoice,
    CodeCompletion,
    Debugging,
    CodingTask,
}

impl QuestionKind {
    /// Returns the wire/display name (`snake_case`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MultipleChoice => "multiple_choice",
            Self::CodeCompletion => "code_completion",
            Self::Debugging => "debugging",
            Self::CodingTask => "coding_task",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionKind {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "multiple_choice" => Ok(Self::MultipleChoice),
            "code_completion" => Ok(Self::CodeCompletion),
            "debugging" => Ok(Self::Debugging),
            "coding_task" => Ok(Self::CodingTask),
            other => Err(QuestionError::UnknownKind(other.to_string())),
        }
    }
}

/// Difficulty tier of a question or lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl Difficulty {
    /// Returns the wire/display name (`snake_case`).
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            other => Err(QuestionError::UnknownDifficulty(other.to_string())),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A single quiz exercise.
///
/// Options may be empty for free-form kinds; the correct answer is the
/// canonical text a submission is compared against, byte for byte, so it is
/// stored exactly as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    id: QuestionId,
    kind: QuestionKind,
    prompt: String,
    options: Vec<String>,
    correct_answer: String,
    explanation: String,
    xp: u32,
    difficulty: Difficulty,
    topic: String,
}

impl Question {
    /// Creates a new Question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` if the prompt is blank and
    /// `QuestionError::EmptyCorrectAnswer` if the correct answer is blank.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: QuestionId,
        kind: QuestionKind,
        prompt: impl Into<String>,
        options: Vec<String>,
        correct_answer: impl Into<String>,
        explanation: impl Into<String>,
        xp: u32,
        difficulty: Difficulty,
        topic: impl Into<String>,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        let correct_answer = correct_answer.into();
        if correct_answer.trim().is_empty() {
            return Err(QuestionError::EmptyCorrectAnswer);
        }

        Ok(Self {
            id,
            kind,
            prompt: prompt.trim().to_owned(),
            options,
            correct_answer,
            explanation: explanation.into(),
            xp,
            difficulty,
            topic: topic.into(),
        })
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn kind(&self) -> QuestionKind {
        self.kind
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn correct_answer(&self) -> &str {
        &self.correct_answer
    }

    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    #[must_use]
    pub fn xp(&self) -> u32 {
        self.xp
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn topic(&self) -> &str {
        &self.topic
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn build_question() -> Question {
        Question::new(
            QuestionId::new("var-1"),
            QuestionKind::MultipleChoice,
            "Which keyword declares a block-scoped variable?",
            vec!["var".into(), "let".into(), "const".into()],
            "let",
            "let declares a block-scoped variable.",
            50,
            Difficulty::Beginner,
            "Variables",
        )
        .unwrap()
    }

    #[test]
    fn question_rejects_blank_prompt() {
        let err = Question::new(
            QuestionId::new("q"),
            QuestionKind::MultipleChoice,
            "   ",
            vec![],
            "x",
            "",
            10,
            Difficulty::Beginner,
            "t",
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::EmptyPrompt);
    }

    #[test]
    fn question_rejects_blank_correct_answer() {
        let err = Question::new(
            QuestionId::new("q"),
            QuestionKind::Debugging,
            "Find the bug",
            vec![],
            "  ",
            "",
            10,
            Difficulty::Beginner,
            "t",
        )
        .unwrap_err();
        assert_eq!(err, QuestionError::EmptyCorrectAnswer);
    }

    #[test]
    fn question_keeps_correct_answer_exact() {
        let q = Question::new(
            QuestionId::new("q"),
            QuestionKind::CodeCompletion,
            "Complete the line",
            vec![],
            "x += 1;",
            "",
            75,
            Difficulty::Intermediate,
            "Loops",
        )
        .unwrap();
        assert_eq!(q.correct_answer(), "x += 1;");
    }

    #[test]
    fn question_happy_path_accessors() {
        let q = build_question();
        assert_eq!(q.id(), &QuestionId::new("var-1"));
        assert_eq!(q.kind(), QuestionKind::MultipleChoice);
        assert_eq!(q.options().len(), 3);
        assert_eq!(q.xp(), 50);
        assert_eq!(q.difficulty(), Difficulty::Beginner);
        assert_eq!(q.topic(), "Variables");
    }

    #[test]
    fn kind_parses_wire_names() {
        assert_eq!(
            "multiple_choice".parse::<QuestionKind>().unwrap(),
            QuestionKind::MultipleChoice
        );
        assert_eq!(
            "coding_task".parse::<QuestionKind>().unwrap(),
            QuestionKind::CodingTask
        );
        assert!(matches!(
            "essay".parse::<QuestionKind>(),
            Err(QuestionError::UnknownKind(_))
        ));
    }

    #[test]
    fn difficulty_parses_wire_names() {
        assert_eq!(
            "advanced".parse::<Difficulty>().unwrap(),
            Difficulty::Advanced
        );
        assert!(matches!(
            "expert".parse::<Difficulty>(),
            Err(QuestionError::UnknownDifficulty(_))
        ));
    }

    #[test]
    fn kind_display_matches_wire_name() {
        assert_eq!(QuestionKind::CodeCompletion.to_string(), "code_completion");
        assert_eq!(Difficulty::Intermediate.to_string(), "intermediate");
    }
}
