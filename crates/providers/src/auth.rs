use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Duration;
use thiserror::Error;
use tracing::debug;

use quest_core::model::{Badge, BadgeId, User, UserError, UserId};
use quest_core::time::Clock;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Errors surfaced by auth providers.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AuthError {
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("an account with this email already exists")]
    EmailTaken,

    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,

    #[error("not signed in")]
    NotSignedIn,

    #[error("no profile found for user {0}")]
    ProfileMissing(UserId),

    #[error(transparent)]
    Profile(#[from] UserError),

    #[error("auth backend error: {0}")]
    Backend(String),
}

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

//
// ─── AUTH PROVIDER ─────────────────────────────────────────────────────────────
//

/// An authenticated session as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    pub user_id: UserId,
    pub email: String,
}

/// Contract for the hosted authentication backend.
///
/// Implementations own credentials, profile storage and streak upkeep; the
/// application only ever sees the resulting `User`.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Register a new account and return its freshly seeded profile.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::EmailTaken`, `AuthError::WeakPassword`, or
    /// profile validation errors.
    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<User, AuthError>;

    /// Authenticate and return the stored profile, its streak refreshed.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a wrong email or password.
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError>;

    /// Drop the current session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Backend` on provider failure.
    async fn sign_out(&self) -> Result<(), AuthError>;

    /// The current session, if somebody is signed in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Backend` on provider failure.
    async fn current_session(&self) -> Result<Option<AuthSession>, AuthError>;

    /// Fetch a profile by user id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ProfileMissing` for an unknown id.
    async fn user_profile(&self, user_id: &UserId) -> Result<User, AuthError>;

    /// Request a password-reset email.
    ///
    /// Always reports success for unknown addresses so callers cannot probe
    /// which emails exist.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Backend` on provider failure.
    async fn reset_password(&self, email: &str) -> Result<(), AuthError>;

    /// Change the signed-in account's password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotSignedIn` without a session and
    /// `AuthError::WeakPassword` for a too-short password.
    async fn update_password(&self, new_password: &str) -> Result<(), AuthError>;
}

//
// ─── IN-MEMORY PROVIDER ────────────────────────────────────────────────────────
//

struct Account {
    password: String,
    profile: User,
}

/// In-memory auth provider for tests and the offline demo.
///
/// Mirrors the hosted backend's observable behavior: sign-up seeds a zeroed
/// profile with a welcome badge, sign-in refreshes the last-active stamp and
/// maintains the consecutive-day streak.
#[derive(Default)]
pub struct InMemoryAuthProvider {
    clock: Mutex<Clock>,
    accounts: Mutex<HashMap<String, Account>>,
    signed_in: Mutex<Option<UserId>>,
}

impl InMemoryAuthProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider on a caller-supplied clock, for deterministic streak tests.
    #[must_use]
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            clock: Mutex::new(clock),
            ..Self::default()
        }
    }

    /// Moves a fixed clock forward; real clocks are unaffected.
    pub fn advance_clock(&self, delta: Duration) {
        if let Ok(mut clock) = self.clock.lock() {
            clock.advance(delta);
        }
    }

    fn now(&self) -> Result<chrono::DateTime<chrono::Utc>, AuthError> {
        let clock = self
            .clock
            .lock()
            .map_err(|e| AuthError::Backend(e.to_string()))?;
        Ok(clock.now())
    }

    fn welcome_badge(earned_at: chrono::DateTime<chrono::Utc>) -> Badge {
        Badge::new(
            BadgeId::new("welcome"),
            "Welcome!",
            "You joined the adventure",
            "👋",
            earned_at,
        )
    }
}

/// Streak rule: same day keeps it alive, the next day extends it, any gap
/// resets to 1. A same-day visit still counts as at least 1.
fn next_streak(
    current: u32,
    last_active: chrono::DateTime<chrono::Utc>,
    now: chrono::DateTime<chrono::Utc>,
) -> u32 {
    let days_between = (now.date_naive() - last_active.date_naive()).num_days();
    match days_between {
        0 => current.max(1),
        1 => current.saturating_add(1),
        _ => 1,
    }
}

#[async_trait]
impl AuthProvider for InMemoryAuthProvider {
    async fn sign_up(&self, email: &str, password: &str, name: &str) -> Result<User, AuthError> {
        if password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }
        let now = self.now()?;
        let key = email.trim().to_lowercase();

        let mut profile = User::fresh(
            UserId::new(uuid::Uuid::new_v4().to_string()),
            email.trim(),
            name,
            now,
        )?;
        profile.award_badge(Self::welcome_badge(now));

        let mut accounts = self
            .accounts
            .lock()
            .map_err(|e| AuthError::Backend(e.to_string()))?;
        if accounts.contains_key(&key) {
            return Err(AuthError::EmailTaken);
        }
        accounts.insert(
            key,
            Account {
                password: password.to_string(),
                profile: profile.clone(),
            },
        );

        let mut signed_in = self
            .signed_in
            .lock()
            .map_err(|e| AuthError::Backend(e.to_string()))?;
        *signed_in = Some(profile.id().clone());

        debug!(user_id = %profile.id(), "account created");
        Ok(profile)
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let now = self.now()?;
        let key = email.trim().to_lowercase();

        let mut accounts = self
            .accounts
            .lock()
            .map_err(|e| AuthError::Backend(e.to_string()))?;
        let account = accounts.get_mut(&key).ok_or(AuthError::InvalidCredentials)?;
        if account.password != password {
            return Err(AuthError::InvalidCredentials);
        }

        let streak = next_streak(account.profile.streak(), account.profile.last_active(), now);
        account.profile.set_streak(streak);
        account.profile.touch_active(now);
        let profile = account.profile.clone();
        drop(accounts);

        let mut signed_in = self
            .signed_in
            .lock()
            .map_err(|e| AuthError::Backend(e.to_string()))?;
        *signed_in = Some(profile.id().clone());

        debug!(user_id = %profile.id(), streak, "signed in");
        Ok(profile)
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        let mut signed_in = self
            .signed_in
            .lock()
            .map_err(|e| AuthError::Backend(e.to_string()))?;
        *signed_in = None;
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<AuthSession>, AuthError> {
        let signed_in = self
            .signed_in
            .lock()
            .map_err(|e| AuthError::Backend(e.to_string()))?;
        let Some(user_id) = signed_in.clone() else {
            return Ok(None);
        };
        drop(signed_in);

        let accounts = self
            .accounts
            .lock()
            .map_err(|e| AuthError::Backend(e.to_string()))?;
        let session = accounts
            .values()
            .find(|account| account.profile.id() == &user_id)
            .map(|account| AuthSession {
                user_id: account.profile.id().clone(),
                email: account.profile.email().to_string(),
            });
        Ok(session)
    }

    async fn user_profile(&self, user_id: &UserId) -> Result<User, AuthError> {
        let accounts = self
            .accounts
            .lock()
            .map_err(|e| AuthError::Backend(e.to_string()))?;
        accounts
            .values()
            .find(|account| account.profile.id() == user_id)
            .map(|account| account.profile.clone())
            .ok_or_else(|| AuthError::ProfileMissing(user_id.clone()))
    }

    async fn reset_password(&self, email: &str) -> Result<(), AuthError> {
        debug!(email, "password reset requested");
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> Result<(), AuthError> {
        if new_password.len() < MIN_PASSWORD_LEN {
            return Err(AuthError::WeakPassword);
        }

        let signed_in = self
            .signed_in
            .lock()
            .map_err(|e| AuthError::Backend(e.to_string()))?;
        let user_id = signed_in.clone().ok_or(AuthError::NotSignedIn)?;
        drop(signed_in);

        let mut accounts = self
            .accounts
            .lock()
            .map_err(|e| AuthError::Backend(e.to_string()))?;
        let account = accounts
            .values_mut()
            .find(|account| account.profile.id() == &user_id)
            .ok_or_else(|| AuthError::ProfileMissing(user_id.clone()))?;
        account.password = new_password.to_string();
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
