//! Startup rehydration of the persisted session
//!
//! Runs once per application lifetime, before any protected view renders:
//!
//! ```text
//! Start ──absent──────────────────────────────────────────► Finalize
//!   │ present
//!   ▼
//! Validate ──invalid──► clear ─────────────────────────────► Finalize
//!   │ valid
//!   ▼
//! Decrypt ──fails─────► clear ─────────────────────────────► Finalize
//!   │ ok
//!   └──► publish user ─────────────────────────────────────► Finalize
//! ```
//!
//! Finalize marks the auth state initialized on every path, including a
//! panic inside any step. Failures never reach the caller; they all resolve
//! to "no session".

use hireboard_types::Claims;
use std::panic::{self, AssertUnwindSafe};

use crate::{InitToken, SessionError, SessionStorage, SessionStore, SharedAuthState, TokenValidator};

/// How a rehydration run ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RehydrationOutcome {
    /// Nothing was stored
    NoSession,
    /// Stored claims were published into the auth state
    Restored,
    /// Token was malformed or expired; storage was cleared
    InvalidToken,
    /// Claims snapshot could not be decrypted or parsed; storage was cleared
    CorruptClaims,
    /// Unexpected failure; storage was cleared
    Failed(String),
}

impl RehydrationOutcome {
    /// Short label for logs and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSession => "no_session",
            Self::Restored => "restored",
            Self::InvalidToken => "invalid_token",
            Self::CorruptClaims => "corrupt_claims",
            Self::Failed(_) => "failed",
        }
    }

    /// Whether a user was restored
    pub fn is_restored(&self) -> bool {
        matches!(self, Self::Restored)
    }

    /// Whether storage was cleared by this run
    pub fn cleared_storage(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken | Self::CorruptClaims | Self::Failed(_)
        )
    }
}

/// Marks the auth state initialized when dropped
struct FinalizeGuard {
    state: SharedAuthState,
    token: Option<InitToken>,
}

impl Drop for FinalizeGuard {
    fn drop(&mut self) {
        if let Some(token) = self.token.take() {
            self.state.mark_initialized(token);
        }
    }
}

/// One-shot session rehydrator.
///
/// Built from the state's [`InitToken`], and [`Rehydrator::run`] consumes
/// itself, so a second run for the same state cannot be expressed.
pub struct Rehydrator<'a, S: SessionStorage> {
    store: &'a SessionStore<S>,
    validator: &'a TokenValidator,
    state: SharedAuthState,
    token: InitToken,
}

impl<'a, S: SessionStorage> Rehydrator<'a, S> {
    /// Create a rehydrator holding the state's init token
    pub fn new(
        store: &'a SessionStore<S>,
        validator: &'a TokenValidator,
        state: &SharedAuthState,
        token: InitToken,
    ) -> Self {
        Self {
            store,
            validator,
            state: state.clone(),
            token,
        }
    }

    /// Take the init token and run. Fails if the state was already claimed.
    pub fn start(
        store: &'a SessionStore<S>,
        validator: &'a TokenValidator,
        state: &SharedAuthState,
    ) -> Result<RehydrationOutcome, SessionError> {
        let token = state.take_init_token().ok_or_else(|| {
            tracing::warn!("Rehydration requested twice; ignoring");
            SessionError::AlreadyInitialized
        })?;
        Ok(Self::new(store, validator, state, token).run())
    }

    /// Run the sequence to completion
    pub fn run(self) -> RehydrationOutcome {
        let Self {
            store,
            validator,
            state,
            token,
        } = self;

        let _finalize = FinalizeGuard {
            state: state.clone(),
            token: Some(token),
        };

        let result = panic::catch_unwind(AssertUnwindSafe(|| restore(store, validator)));

        match result {
            Ok(Ok(Some(claims))) => {
                state.set_user(claims);
                tracing::info!("Session restored from storage");
                RehydrationOutcome::Restored
            }
            Ok(Ok(None)) => {
                tracing::debug!("No stored session");
                RehydrationOutcome::NoSession
            }
            Ok(Err(e)) if e.invalidates_session() => {
                clear_defensively(store);
                if matches!(e, SessionError::InvalidToken | SessionError::TokenExpired) {
                    tracing::warn!("Stored token rejected ({}), session cleared", e);
                    RehydrationOutcome::InvalidToken
                } else {
                    tracing::warn!("Failed to decrypt stored claims ({}), session cleared", e);
                    RehydrationOutcome::CorruptClaims
                }
            }
            Ok(Err(e)) => {
                tracing::error!("Error rehydrating auth state: {}", e);
                clear_defensively(store);
                RehydrationOutcome::Failed(e.to_string())
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!("Rehydration panicked: {}", message);
                clear_defensively(store);
                RehydrationOutcome::Failed(message)
            }
        }
    }
}

/// Clear the store without letting a misbehaving backend escape rehydration
fn clear_defensively<S: SessionStorage>(store: &SessionStore<S>) {
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| store.clear())) {
        tracing::error!(
            "Clearing the session panicked: {}",
            panic_message(payload.as_ref())
        );
    }
}

/// Read, validate and decrypt. `Ok(None)` means nothing was stored.
fn restore<S: SessionStorage>(
    store: &SessionStore<S>,
    validator: &TokenValidator,
) -> Result<Option<Claims>, SessionError> {
    let Some(session) = store.read() else {
        return Ok(None);
    };

    validator.check(&session.token)?;

    store.decrypt_claims(&session).map(Some)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
