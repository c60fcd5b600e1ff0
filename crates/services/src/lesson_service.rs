use chrono::{DateTime, Utc};
use tracing::debug;

use quest_core::model::{Badge, BadgeId, Lesson, LessonId, QuizSession, SessionId, SkillSection};
use quest_core::progress::{self, LessonStatus, SectionProgress};
use quest_core::{AppState, Clock, catalog};

use crate::error::LessonServiceError;

//
// ─── COMPLETION ────────────────────────────────────────────────────────────────
//

/// Outcome of recording a lesson completion.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonCompletion {
    pub lesson_id: LessonId,
    pub xp_awarded: u32,
    pub badge: Option<Badge>,
    pub already_completed: bool,
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Serves the static lesson catalog: skill-tree evaluation, completion
/// awards, and lesson-quiz starts. All synchronous; the catalog is built
/// once and owned by the service.
pub struct LessonService {
    sections: Vec<SkillSection>,
    clock: Clock,
}

impl LessonService {
    /// Build the service over the built-in catalog.
    ///
    /// # Errors
    ///
    /// Propagates catalog construction failures.
    pub fn new() -> Result<Self, LessonServiceError> {
        Ok(Self {
            sections: catalog::sections()?,
            clock: Clock::default(),
        })
    }

    /// Override the clock (badge stamps, quiz start times).
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn sections(&self) -> &[SkillSection] {
        &self.sections
    }

    /// Find a catalog lesson by id.
    #[must_use]
    pub fn lesson(&self, id: &LessonId) -> Option<&Lesson> {
        catalog::find_lesson(&self.sections, id)
    }

    /// Evaluate every section against the signed-in user's completions.
    ///
    /// Without a user everything reads as locked.
    #[must_use]
    pub fn skill_tree(&self, state: &AppState) -> Vec<SectionProgress> {
        let completed = state.user().map(|user| user.completed_lessons());
        progress::evaluate_catalog(&self.sections, completed)
    }

    /// Record a lesson completion and apply its awards.
    ///
    /// The first completion appends the lesson to the user's list, awards
    /// the lesson's XP, and grants the first-lesson badge when nothing was
    /// completed before. Completing a lesson again is accepted but awards
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns `UnknownLesson` for an id outside the catalog, `NoUser`
    /// without a signed-in user, and `Locked` while prerequisites are open.
    pub fn complete_lesson(
        &self,
        state: &mut AppState,
        id: &LessonId,
    ) -> Result<LessonCompletion, LessonServiceError> {
        let lesson = self
            .lesson(id)
            .ok_or_else(|| LessonServiceError::UnknownLesson(id.clone()))?;
        let user = state.user().ok_or(LessonServiceError::NoUser)?;

        match progress::lesson_status(lesson, Some(user.completed_lessons())) {
            LessonStatus::Locked => return Err(LessonServiceError::Locked(id.clone())),
            LessonStatus::Completed => {
                return Ok(LessonCompletion {
                    lesson_id: id.clone(),
                    xp_awarded: 0,
                    badge: None,
                    already_completed: true,
                });
            }
            LessonStatus::Available => {}
        }

        let first_ever = user.completed_lessons().is_empty();
        let xp = lesson.xp_reward();
        state.complete_lesson(id.clone());
        state.add_xp(xp);

        let badge = first_ever.then(|| Self::first_lesson_badge(self.clock.now()));
        if let Some(badge) = &badge {
            state.award_badge(badge.clone());
        }

        debug!(lesson = %id, xp, first_ever, "lesson completed");
        Ok(LessonCompletion {
            lesson_id: id.clone(),
            xp_awarded: xp,
            badge,
            already_completed: false,
        })
    }

    /// Snapshot a lesson's questions into a fresh active session.
    ///
    /// # Errors
    ///
    /// Returns `NoQuestions` for lessons without an authored quiz, plus the
    /// same lookup and locking errors as [`Self::complete_lesson`].
    pub fn start_lesson_quiz(
        &self,
        state: &mut AppState,
        id: &LessonId,
    ) -> Result<SessionId, LessonServiceError> {
        let lesson = self
            .lesson(id)
            .ok_or_else(|| LessonServiceError::UnknownLesson(id.clone()))?;
        let user = state.user().ok_or(LessonServiceError::NoUser)?;
        if progress::lesson_status(lesson, Some(user.completed_lessons())) == LessonStatus::Locked {
            return Err(LessonServiceError::Locked(id.clone()));
        }
        if lesson.questions().is_empty() {
            return Err(LessonServiceError::NoQuestions(id.clone()));
        }

        let session =
            QuizSession::new(lesson.topic(), lesson.questions().to_vec(), self.clock.now())?;
        let session_id = session.id().clone();
        state.start_quiz(session);
        debug!(lesson = %id, session = %session_id, "lesson quiz started");
        Ok(session_id)
    }

    fn first_lesson_badge(earned_at: DateTime<Utc>) -> Badge {
        Badge::new(
            BadgeId::new("first-lesson"),
            "First Steps",
            "You completed your first lesson",
            "🎯",
            earned_at,
        )
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use quest_core::model::{User, UserId};
    use quest_core::time::{fixed_clock, fixed_now};

    fn build_service() -> LessonService {
        LessonService::new().unwrap().with_clock(fixed_clock())
    }

    fn signed_in_state() -> AppState {
        let mut state = AppState::new();
        let user = User::fresh(UserId::new("u-1"), "dev@example.com", "Dev", fixed_now()).unwrap();
        state.set_user(Some(user));
        state
    }

    #[test]
    fn skill_tree_is_fully_locked_without_a_user() {
        let service = build_service();
        let state = AppState::new();

        let tree = service.skill_tree(&state);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree[0].completed, 0);
        assert!(
            tree[0]
                .lessons
                .iter()
                .all(|lesson| lesson.status == LessonStatus::Locked)
        );
    }

    #[test]
    fn first_completion_awards_xp_and_the_first_lesson_badge() {
        let service = build_service();
        let mut state = signed_in_state();

        let completion = service
            .complete_lesson(&mut state, &LessonId::new("variables-basics"))
            .unwrap();

        assert_eq!(completion.xp_awarded, 100);
        assert!(!completion.already_completed);
        assert_eq!(
            completion.badge.as_ref().map(Badge::id),
            Some(&BadgeId::new("first-lesson"))
        );

        let user = state.user().unwrap();
        assert_eq!(user.xp(), 100);
        assert!(user.has_completed(&LessonId::new("variables-basics")));
        assert_eq!(user.badges().len(), 1);
    }

    #[test]
    fn repeat_completion_awards_nothing() {
        let service = build_service();
        let mut state = signed_in_state();
        let id = LessonId::new("variables-basics");

        service.complete_lesson(&mut state, &id).unwrap();
        let repeat = service.complete_lesson(&mut state, &id).unwrap();

        assert!(repeat.already_completed);
        assert_eq!(repeat.xp_awarded, 0);
        assert!(repeat.badge.is_none());
        assert_eq!(state.user().unwrap().xp(), 100);
        assert_eq!(state.user().unwrap().completed_lessons().len(), 1);
    }

    #[test]
    fn second_completion_does_not_regrant_the_badge() {
        let service = build_service();
        let mut state = signed_in_state();

        service
            .complete_lesson(&mut state, &LessonId::new("variables-basics"))
            .unwrap();
        let second = service
            .complete_lesson(&mut state, &LessonId::new("data-types"))
            .unwrap();

        assert_eq!(second.xp_awarded, 120);
        assert!(second.badge.is_none());
        assert_eq!(state.user().unwrap().badges().len(), 1);
    }

    #[test]
    fn locked_lessons_cannot_be_completed() {
        let service = build_service();
        let mut state = signed_in_state();

        let err = service
            .complete_lesson(&mut state, &LessonId::new("conditionals"))
            .unwrap_err();

        assert!(matches!(err, LessonServiceError::Locked(_)));
        assert_eq!(state.user().unwrap().xp(), 0);
    }

    #[test]
    fn unknown_lessons_are_rejected() {
        let service = build_service();
        let mut state = signed_in_state();

        let err = service
            .complete_lesson(&mut state, &LessonId::new("flexbox"))
            .unwrap_err();

        assert!(matches!(err, LessonServiceError::UnknownLesson(_)));
    }

    #[test]
    fn completion_requires_a_user() {
        let service = build_service();
        let mut state = AppState::new();

        let err = service
            .complete_lesson(&mut state, &LessonId::new("variables-basics"))
            .unwrap_err();

        assert!(matches!(err, LessonServiceError::NoUser));
    }

    #[test]
    fn start_lesson_quiz_snapshots_the_questions() {
        let service = build_service();
        let mut state = signed_in_state();

        let session_id = service
            .start_lesson_quiz(&mut state, &LessonId::new("variables-basics"))
            .unwrap();

        let quiz = state.quiz().unwrap();
        assert_eq!(quiz.id(), &session_id);
        assert_eq!(quiz.question_count(), 2);
        assert_eq!(quiz.current_index(), 0);
        assert_eq!(quiz.score(), 0);
        assert!(!quiz.is_completed());
    }

    #[test]
    fn questionless_lessons_cannot_start_a_quiz() {
        let service = build_service();
        let mut state = signed_in_state();
        service
            .complete_lesson(&mut state, &LessonId::new("variables-basics"))
            .unwrap();

        let err = service
            .start_lesson_quiz(&mut state, &LessonId::new("data-types"))
            .unwrap_err();

        assert!(matches!(err, LessonServiceError::NoQuestions(_)));
        assert!(state.quiz().is_none());
    }
}
