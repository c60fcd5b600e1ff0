use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{BadgeId, LessonId, UserId};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("user name cannot be empty")]
    EmptyName,

    #[error("invalid email address: {0}")]
    InvalidEmail(String),
}

//
// ─── BADGE ─────────────────────────────────────────────────────────────────────
//

/// An achievement attached to a user profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    id: BadgeId,
    name: String,
    description: String,
    icon: String,
    earned_at: DateTime<Utc>,
}

impl Badge {
    /// Creates a new Badge.
    #[must_use]
    pub fn new(
        id: BadgeId,
        name: impl Into<String>,
        description: impl Into<String>,
        icon: impl Into<String>,
        earned_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            description: description.into(),
            icon: icon.into(),
            earned_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> &BadgeId {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
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
    pub fn earned_at(&self) -> DateTime<Utc> {
        self.earned_at
    }
}

//
// ─── USER ──────────────────────────────────────────────────────────────────────
//

/// A learner profile with gamification counters.
///
/// Level is never stored; it is derived from total XP so the two can never
/// disagree. XP only ever goes up, the streak is replaced wholesale by
/// whoever maintains it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: String,
    name: String,
    xp: u32,
    streak: u32,
    completed_lessons: Vec<LessonId>,
    badges: Vec<Badge>,
    created_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
}

/// XP span of one level band.
const XP_PER_LEVEL: u32 = 1000;

impl User {
    /// Creates a User from existing profile data.
    ///
    /// # Errors
    ///
    /// Returns `UserError::EmptyName` if the name is blank and
    /// `UserError::InvalidEmail` if the email has no `@`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: UserId,
        email: impl Into<String>,
        name: impl Into<String>,
        xp: u32,
        streak: u32,
        completed_lessons: Vec<LessonId>,
        badges: Vec<Badge>,
        created_at: DateTime<Utc>,
        last_active: DateTime<Utc>,
    ) -> Result<Self, UserError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(UserError::EmptyName);
        }
        let email = email.into();
        if !email.contains('@') {
            return Err(UserError::InvalidEmail(email));
        }

        Ok(Self {
            id,
            email,
            name: name.trim().to_owned(),
            xp,
            streak,
            completed_lessons,
            badges,
            created_at,
            last_active,
        })
    }

    /// Creates a brand-new profile with zeroed counters.
    ///
    /// # Errors
    ///
    /// Same validation as [`User::new`].
    pub fn fresh(
        id: UserId,
        email: impl Into<String>,
        name: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Result<Self, UserError> {
        Self::new(id, email, name, 0, 0, Vec::new(), Vec::new(), now, now)
    }

    // Accessors
    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn xp(&self) -> u32 {
        self.xp
    }

    #[must_use]
    pub fn streak(&self) -> u32 {
        self.streak
    }

    #[must_use]
    pub fn completed_lessons(&self) -> &[LessonId] {
        &self.completed_lessons
    }

    #[must_use]
    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn last_active(&self) -> DateTime<Utc> {
        self.last_active
    }

    /// Current level, derived from XP: one level per 1000 XP, starting at 1.
    #[must_use]
    pub fn level(&self) -> u32 {
        self.xp / XP_PER_LEVEL + 1
    }

    /// Fraction of the current level band already earned, in `[0, 1)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn level_progress(&self) -> f32 {
        (self.xp % XP_PER_LEVEL) as f32 / XP_PER_LEVEL as f32
    }

    /// Total XP at which the next level is reached.
    #[must_use]
    pub fn next_level_xp(&self) -> u32 {
        self.level().saturating_mul(XP_PER_LEVEL)
    }

    #[must_use]
    pub fn has_completed(&self, lesson: &LessonId) -> bool {
        self.completed_lessons.contains(lesson)
    }

    // Mutators
    /// Adds XP to the running total, saturating at `u32::MAX`.
    pub fn add_xp(&mut self, amount: u32) {
        self.xp = self.xp.saturating_add(amount);
    }

    /// Replaces the streak counter.
    pub fn set_streak(&mut self, streak: u32) {
        self.streak = streak;
    }

    /// Records a lesson completion.
    ///
    /// Appends unconditionally; callers that need once-only semantics check
    /// [`User::has_completed`] first.
    pub fn complete_lesson(&mut self, lesson: LessonId) {
        self.completed_lessons.push(lesson);
    }

    /// Attaches a badge unless one with the same id is already present.
    pub fn award_badge(&mut self, badge: Badge) {
        if self.badges.iter().any(|b| b.id() == badge.id()) {
            return;
        }
        self.badges.push(badge);
    }

    /// Refreshes the last-active timestamp.
    pub fn touch_active(&mut self, now: DateTime<Utc>) {
        self.last_active = now;
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
