//! Loading/error flag choreography shared by the async services.

use std::error::Error;

use quest_core::AppState;

/// Marks the start of a collaborator call: loading on, stale error cleared.
pub(crate) fn begin(state: &mut AppState) {
    state.set_loading(true);
    state.set_error(None);
}

/// Settles a collaborator result. A failure lands in the error flag as a
/// user-facing message; loading is cleared either way. State transitions
/// stay with the caller, so nothing else is applied on failure.
pub(crate) fn settle<T, E: Error>(state: &mut AppState, result: Result<T, E>) -> Result<T, E> {
    if let Err(err) = &result {
        state.set_error(Some(err.to_string()));
    }
    state.set_loading(false);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("backend unavailable")]
    struct Boom;

    #[test]
    fn begin_raises_loading_and_clears_stale_errors() {
        let mut state = AppState::new();
        state.set_error(Some("old failure".into()));

        begin(&mut state);
        assert!(state.is_loading());
        assert!(state.error().is_none());
    }

    #[test]
    fn settle_records_failures_and_always_clears_loading() {
        let mut state = AppState::new();

        begin(&mut state);
        assert!(settle(&mut state, Ok::<_, Boom>(7)).is_ok());
        assert!(!state.is_loading());
        assert!(state.error().is_none());

        begin(&mut state);
        assert!(settle(&mut state, Err::<(), _>(Boom)).is_err());
        assert!(!state.is_loading());
        assert_eq!(state.error(), Some("backend unavailable"));
    }
}
