use std::sync::Arc;

use tracing::debug;

use providers::{AuthError, AuthProvider};
use quest_core::AppState;
use quest_core::model::User;

use crate::error::AuthServiceError;
use crate::flags;

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Drives authentication flows against the provider seam.
///
/// Every operation that talks to the provider follows the same flag
/// choreography: loading on and stale error cleared before the await, store
/// transitions applied only on success, the error flag set only on failure,
/// loading cleared either way. The store is never borrowed across an await.
pub struct AuthService {
    provider: Arc<dyn AuthProvider>,
}

impl AuthService {
    #[must_use]
    pub fn new(provider: Arc<dyn AuthProvider>) -> Self {
        Self { provider }
    }

    /// Register a new account and sign the user in.
    ///
    /// # Errors
    ///
    /// Rejects blank inputs before any flag changes; provider failures are
    /// recorded in the error flag and propagated.
    pub async fn sign_up(
        &self,
        state: &mut AppState,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<(), AuthServiceError> {
        if email.trim().is_empty() {
            return Err(AuthServiceError::BlankEmail);
        }
        if password.trim().is_empty() {
            return Err(AuthServiceError::BlankPassword);
        }
        if name.trim().is_empty() {
            return Err(AuthServiceError::BlankName);
        }

        flags::begin(state);
        let user = flags::settle(state, self.provider.sign_up(email, password, name).await)?;
        debug!(user_id = %user.id(), "signed up");
        state.set_user(Some(user));
        Ok(())
    }

    /// Authenticate an existing account.
    ///
    /// # Errors
    ///
    /// Rejects blank inputs before any flag changes; provider failures are
    /// recorded in the error flag and propagated.
    pub async fn sign_in(
        &self,
        state: &mut AppState,
        email: &str,
        password: &str,
    ) -> Result<(), AuthServiceError> {
        if email.trim().is_empty() {
            return Err(AuthServiceError::BlankEmail);
        }
        if password.trim().is_empty() {
            return Err(AuthServiceError::BlankPassword);
        }

        flags::begin(state);
        let user = flags::settle(state, self.provider.sign_in(email, password).await)?;
        debug!(user_id = %user.id(), streak = user.streak(), "signed in");
        state.set_user(Some(user));
        Ok(())
    }

    /// Sign out and clear the user. An active quiz, if any, stays put.
    ///
    /// # Errors
    ///
    /// Provider failures are recorded in the error flag and propagated; the
    /// user is kept in that case.
    pub async fn sign_out(&self, state: &mut AppState) -> Result<(), AuthServiceError> {
        flags::begin(state);
        flags::settle(state, self.provider.sign_out().await)?;
        state.set_user(None);
        Ok(())
    }

    /// Restore the user from a previously established provider session.
    ///
    /// Returns `false` when the provider has no session; the store is left
    /// as it was.
    ///
    /// # Errors
    ///
    /// Provider failures are recorded in the error flag and propagated.
    pub async fn restore_session(&self, state: &mut AppState) -> Result<bool, AuthServiceError> {
        flags::begin(state);
        match flags::settle(state, self.session_user().await)? {
            Some(user) => {
                debug!(user_id = %user.id(), "session restored");
                state.set_user(Some(user));
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn session_user(&self) -> Result<Option<User>, AuthError> {
        let Some(session) = self.provider.current_session().await? else {
            return Ok(None);
        };
        let user = self.provider.user_profile(&session.user_id).await?;
        Ok(Some(user))
    }

    /// Request a password-reset email. Stateless; the store is not involved.
    ///
    /// # Errors
    ///
    /// Rejects a blank email; otherwise propagates provider failures.
    pub async fn reset_password(&self, email: &str) -> Result<(), AuthServiceError> {
        if email.trim().is_empty() {
            return Err(AuthServiceError::BlankEmail);
        }
        Ok(self.provider.reset_password(email).await?)
    }

    /// Change the signed-in account's password. Stateless; the store is not
    /// involved.
    ///
    /// # Errors
    ///
    /// Rejects a blank password; otherwise propagates provider failures,
    /// including `AuthError::NotSignedIn` and `AuthError::WeakPassword`.
    pub async fn update_password(&self, new_password: &str) -> Result<(), AuthServiceError> {
        if new_password.trim().is_empty() {
            return Err(AuthServiceError::BlankPassword);
        }
        Ok(self.provider.update_password(new_password).await?)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
