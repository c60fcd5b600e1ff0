use crate::model::{Badge, LessonId, QuizSession, QuizSessionError, QuizSessionPatch, User};

//
// ─── APP STATE ─────────────────────────────────────────────────────────────────
//

/// Single source of truth for the client: the signed-in user, the active
/// quiz, and the transient loading/error flags.
///
/// There are no globals; whoever owns the event loop owns the one `AppState`
/// and passes it to services by `&mut`. Every transition below runs to
/// completion, touches nothing but its own fields, and is total: a missing
/// user or session makes user/session transitions a no-op, never a fault.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AppState {
    user: Option<User>,
    quiz: Option<QuizSession>,
    loading: bool,
    error: Option<String>,
}

impl AppState {
    /// Creates an empty state: signed out, no quiz, flags cleared.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // Accessors
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[must_use]
    pub fn quiz(&self) -> Option<&QuizSession> {
        self.quiz.as_ref()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    // ─── User transitions ──────────────────────────────────────────────────

    /// Replaces the signed-in user wholesale; `None` signs out.
    pub fn set_user(&mut self, user: Option<User>) {
        self.user = user;
    }

    /// Adds XP to the signed-in user, saturating. No-op when signed out.
    pub fn add_xp(&mut self, amount: u32) {
        if let Some(user) = self.user.as_mut() {
            user.add_xp(amount);
        }
    }

    /// Replaces the streak counter. No-op when signed out.
    pub fn set_streak(&mut self, streak: u32) {
        if let Some(user) = self.user.as_mut() {
            user.set_streak(streak);
        }
    }

    /// Appends a completed lesson id. No-op when signed out.
    pub fn complete_lesson(&mut self, lesson: LessonId) {
        if let Some(user) = self.user.as_mut() {
            user.complete_lesson(lesson);
        }
    }

    /// Attaches a badge, deduplicated by id. No-op when signed out.
    pub fn award_badge(&mut self, badge: Badge) {
        if let Some(user) = self.user.as_mut() {
            user.award_badge(badge);
        }
    }

    // ─── Quiz transitions ──────────────────────────────────────────────────

    /// Installs a new active session, replacing any current one.
    pub fn start_quiz(&mut self, session: QuizSession) {
        self.quiz = Some(session);
    }

    /// Applies a partial update to the active session.
    ///
    /// With no active session this is an accepted no-op.
    ///
    /// # Errors
    ///
    /// Propagates [`QuizSessionError`] when a patched field fails validation;
    /// the session is left untouched in that case.
    pub fn update_quiz(&mut self, patch: QuizSessionPatch) -> Result<(), QuizSessionError> {
        match self.quiz.as_mut() {
            Some(session) => session.apply(patch),
            None => Ok(()),
        }
    }

    /// Removes and returns the active session, if any.
    pub fn end_quiz(&mut self) -> Option<QuizSession> {
        self.quiz.take()
    }

    // ─── Flag transitions ──────────────────────────────────────────────────

    /// Sets the loading flag, last write wins.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Sets or clears the user-facing error message, last write wins.
    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        BadgeId, Difficulty, Question, QuestionId, QuestionKind, UserId,
    };
    use crate::time::fixed_now;

    fn build_user() -> User {
        User::fresh(UserId::new("u-1"), "dev@example.com", "Dev", fixed_now()).unwrap()
    }

    fn build_question(id: &str) -> Question {
        Question::new(
            QuestionId::new(id),
            QuestionKind::MultipleChoice,
            "Prompt?",
            vec!["a".into(), "b".into()],
            "a",
            "",
            50,
            Difficulty::Beginner,
            "Testing",
        )
        .unwrap()
    }

    fn build_quiz(topic: &str) -> QuizSession {
        QuizSession::new(topic, vec![build_question("q-1")], fixed_now()).unwrap()
    }

    #[test]
    fn new_state_is_empty() {
        let state = AppState::new();
        assert!(state.user().is_none());
        assert!(state.quiz().is_none());
        assert!(!state.is_loading());
        assert!(state.error().is_none());
    }

    #[test]
    fn set_user_replaces_and_clears() {
        let mut state = AppState::new();
        state.set_user(Some(build_user()));
        assert_eq!(state.user().unwrap().name(), "Dev");
        state.set_user(None);
        assert!(state.user().is_none());
    }

    #[test]
    fn user_transitions_are_noops_when_signed_out() {
        let mut state = AppState::new();
        state.add_xp(100);
        state.set_streak(5);
        state.complete_lesson(LessonId::new("loops"));
        state.award_badge(Badge::new(
            BadgeId::new("welcome"),
            "Welcome",
            "",
            "👋",
            fixed_now(),
        ));
        assert!(state.user().is_none());
    }

    #[test]
    fn add_xp_reaches_the_user() {
        let mut state = AppState::new();
        state.set_user(Some(build_user()));
        state.add_xp(50);
        state.add_xp(50);
        assert_eq!(state.user().unwrap().xp(), 100);
    }

    #[test]
    fn start_quiz_replaces_active_session() {
        let mut state = AppState::new();
        state.start_quiz(build_quiz("First"));
        state.start_quiz(build_quiz("Second"));
        assert_eq!(state.quiz().unwrap().topic(), "Second");
    }

    #[test]
    fn update_quiz_without_session_is_accepted() {
        let mut state = AppState::new();
        let patch = QuizSessionPatch {
            score: Some(50),
            ..QuizSessionPatch::default()
        };
        assert!(state.update_quiz(patch).is_ok());
        assert!(state.quiz().is_none());
    }

    #[test]
    fn update_quiz_applies_patch() {
        let mut state = AppState::new();
        state.start_quiz(build_quiz("Topic"));
        state
            .update_quiz(QuizSessionPatch {
                score: Some(50),
                ..QuizSessionPatch::default()
            })
            .unwrap();
        assert_eq!(state.quiz().unwrap().score(), 50);
    }

    #[test]
    fn update_quiz_propagates_validation_errors() {
        let mut state = AppState::new();
        state.start_quiz(build_quiz("Topic"));
        let err = state
            .update_quiz(QuizSessionPatch {
                current_question_index: Some(9),
                ..QuizSessionPatch::default()
            })
            .unwrap_err();
        assert!(matches!(err, QuizSessionError::IndexOutOfBounds { .. }));
    }

    #[test]
    fn end_quiz_takes_the_session() {
        let mut state = AppState::new();
        state.start_quiz(build_quiz("Topic"));
        let ended = state.end_quiz();
        assert_eq!(ended.unwrap().topic(), "Topic");
        assert!(state.quiz().is_none());
        assert!(state.end_quiz().is_none());
    }

    #[test]
    fn flags_are_last_write_wins() {
        let mut state = AppState::new();
        state.set_loading(true);
        state.set_error(Some("boom".into()));
        assert!(state.is_loading());
        assert_eq!(state.error(), Some("boom"));
        state.set_loading(false);
        state.set_error(None);
        assert!(!state.is_loading());
        assert!(state.error().is_none());
    }
}
