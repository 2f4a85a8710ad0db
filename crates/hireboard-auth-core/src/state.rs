//! Shared auth state and the read-only view handed to protected views
//!
//! The composition root constructs one [`SharedAuthState`] and passes it
//! down. Writers (rehydration, login, logout) hold the shared handle; views
//! get an [`AuthView`] that can only read and wait.

use hireboard_types::Claims;
use parking_lot::{Condvar, Mutex};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Route unauthenticated users are sent to
pub const LOGIN_ROUTE: &str = "/";

/// Auth state snapshot.
///
/// `is_authenticated` is derived from `user`, so the two cannot disagree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    user: Option<Claims>,
    is_initialized: bool,
    error: Option<String>,
}

impl AuthState {
    /// Signed-in user's claims
    pub fn user(&self) -> Option<&Claims> {
        self.user.as_ref()
    }

    /// Whether a user is signed in
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Whether startup rehydration has finished
    pub fn is_initialized(&self) -> bool {
        self.is_initialized
    }

    /// Last login error, if any
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// JSON rendering with the field names the dashboard uses
    pub fn to_json(&self) -> Value {
        json!({
            "user": self.user,
            "isAuthenticated": self.is_authenticated(),
            "isInitialized": self.is_initialized,
            "error": self.error,
        })
    }
}

/// Decision for a view that requires authentication
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Rehydration has not finished; show a loader
    Pending,
    /// Initialized without a user; send to the login route
    RedirectToLogin,
    /// Signed in; render the view
    Allow,
}

impl Gate {
    /// Short label for logs and CLI output
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::RedirectToLogin => "redirect_to_login",
            Self::Allow => "allow",
        }
    }

    /// Route to navigate to, if any
    pub fn redirect_path(&self) -> Option<&'static str> {
        match self {
            Self::RedirectToLogin => Some(LOGIN_ROUTE),
            Self::Pending | Self::Allow => None,
        }
    }
}

/// One-shot capability to finish initialization.
///
/// Only one exists per [`SharedAuthState`]; consuming it is the only way to
/// flip `is_initialized`.
#[derive(Debug)]
pub struct InitToken {
    _private: (),
}

struct Inner {
    state: Mutex<AuthState>,
    initialized: Condvar,
    token_taken: AtomicBool,
}

/// Writable handle to the auth state
#[derive(Clone)]
pub struct SharedAuthState {
    inner: Arc<Inner>,
}

impl SharedAuthState {
    /// Create a fresh, uninitialized state
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(AuthState::default()),
                initialized: Condvar::new(),
                token_taken: AtomicBool::new(false),
            }),
        }
    }

    /// Take the initialization token. Returns `Some` exactly once.
    pub fn take_init_token(&self) -> Option<InitToken> {
        if self.inner.token_taken.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(InitToken { _private: () })
        }
    }

    /// Read-only view for consumers
    pub fn view(&self) -> AuthView {
        AuthView {
            inner: Arc::clone(&self.inner),
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> AuthState {
        self.inner.state.lock().clone()
    }

    /// Publish a signed-in user
    pub fn set_user(&self, claims: Claims) {
        let mut state = self.inner.state.lock();
        state.user = Some(claims);
        state.error = None;
    }

    /// Drop the signed-in user and any error. Initialization is untouched.
    pub fn logout(&self) {
        let mut state = self.inner.state.lock();
        state.user = None;
        state.error = None;
    }

    /// Record a user-facing error
    pub fn set_error(&self, message: impl Into<String>) {
        self.inner.state.lock().error = Some(message.into());
    }

    /// Mark initialization finished and wake waiting views
    pub fn mark_initialized(&self, token: InitToken) {
        let InitToken { _private: () } = token;
        let mut state = self.inner.state.lock();
        state.is_initialized = true;
        self.inner.initialized.notify_all();
    }
}

impl Default for SharedAuthState {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SharedAuthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedAuthState")
            .field("state", &*self.inner.state.lock())
            .finish_non_exhaustive()
    }
}

/// Read-only auth state capability
#[derive(Clone)]
pub struct AuthView {
    inner: Arc<Inner>,
}

impl AuthView {
    /// Current snapshot
    pub fn snapshot(&self) -> AuthState {
        self.inner.state.lock().clone()
    }

    /// Whether a user is signed in
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.lock().is_authenticated()
    }

    /// Whether startup rehydration has finished
    pub fn is_initialized(&self) -> bool {
        self.inner.state.lock().is_initialized
    }

    /// Signed-in user's claims
    pub fn user(&self) -> Option<Claims> {
        self.inner.state.lock().user.clone()
    }

    /// Last login error
    pub fn error(&self) -> Option<String> {
        self.inner.state.lock().error.clone()
    }

    /// Gate decision for a protected view
    pub fn gate(&self) -> Gate {
        let state = self.inner.state.lock();
        if !state.is_initialized {
            Gate::Pending
        } else if state.is_authenticated() {
            Gate::Allow
        } else {
            Gate::RedirectToLogin
        }
    }

    /// Block until initialized or `timeout` elapses. Returns the final flag.
    pub fn wait_until_initialized(&self, timeout: Duration) -> bool {
        let mut state = self.inner.state.lock();
        if state.is_initialized {
            return true;
        }

        // A timeout too large to represent as an instant means "no deadline"
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            while !state.is_initialized {
                self.inner.initialized.wait(&mut state);
            }
            return true;
        };

        while !state.is_initialized {
            if self
                .inner
                .initialized
                .wait_until(&mut state, deadline)
                .timed_out()
            {
                return state.is_initialized;
            }
        }
        true
    }
}

impl std::fmt::Debug for AuthView {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthView")
            .field("state", &*self.inner.state.lock())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn claims() -> Claims {
        Claims::new().with("id", "u1").with("role", "admin")
    }

    #[test]
    fn test_initial_state() {
        let state = SharedAuthState::new();
        let snapshot = state.snapshot();
        assert!(snapshot.user().is_none());
        assert!(!snapshot.is_authenticated());
        assert!(!snapshot.is_initialized());
        assert!(snapshot.error().is_none());
        assert_eq!(state.view().gate(), Gate::Pending);
    }

    #[test]
    fn test_init_token_is_one_shot() {
        let state = SharedAuthState::new();
        assert!(state.take_init_token().is_some());
        assert!(state.take_init_token().is_none());
        assert!(state.clone().take_init_token().is_none());
    }

    #[test]
    fn test_authenticated_tracks_user() {
        let state = SharedAuthState::new();
        state.set_user(claims());
        assert!(state.view().is_authenticated());
        assert_eq!(state.view().user(), Some(claims()));

        state.logout();
        assert!(!state.view().is_authenticated());
        assert!(state.view().user().is_none());
    }

    #[test]
    fn test_set_user_clears_error() {
        let state = SharedAuthState::new();
        state.set_error("Login failed");
        assert_eq!(state.view().error().as_deref(), Some("Login failed"));
        state.set_user(claims());
        assert!(state.view().error().is_none());
    }

    #[test]
    fn test_logout_keeps_initialized() {
        let state = SharedAuthState::new();
        let token = state.take_init_token().unwrap();
        state.mark_initialized(token);
        state.set_user(claims());
        state.logout();
        assert!(state.view().is_initialized());
        assert_eq!(state.view().gate(), Gate::RedirectToLogin);
    }

    #[test]
    fn test_gate_transitions() {
        let state = SharedAuthState::new();
        let view = state.view();
        assert_eq!(view.gate(), Gate::Pending);
        assert_eq!(view.gate().redirect_path(), None);

        state.mark_initialized(state.take_init_token().unwrap());
        assert_eq!(view.gate(), Gate::RedirectToLogin);
        assert_eq!(view.gate().redirect_path(), Some("/"));

        state.set_user(claims());
        assert_eq!(view.gate(), Gate::Allow);
    }

    #[test]
    fn test_wait_until_initialized_times_out() {
        let state = SharedAuthState::new();
        assert!(!state.view().wait_until_initialized(Duration::from_millis(10)));
    }

    #[test]
    fn test_wait_until_initialized_wakes() {
        let state = SharedAuthState::new();
        let view = state.view();
        let token = state.take_init_token().unwrap();

        let waiter = thread::spawn(move || view.wait_until_initialized(Duration::from_secs(5)));
        thread::sleep(Duration::from_millis(20));
        state.mark_initialized(token);

        assert!(waiter.join().unwrap());
    }

    #[test]
    fn test_wait_without_deadline_after_initialized() {
        let state = SharedAuthState::new();
        state.mark_initialized(state.take_init_token().unwrap());
        assert!(state.view().wait_until_initialized(Duration::MAX));
    }

    #[test]
    fn test_wait_without_deadline_wakes() {
        let state = SharedAuthState::new();
        let view = state.view();
        let token = state.take_init_token().unwrap();

        let waiter = thread::spawn(move || view.wait_until_initialized(Duration::MAX));
        thread::sleep(Duration::from_millis(20));
        state.mark_initialized(token);

        assert!(waiter.join().unwrap());
    }

    #[test]
    fn test_to_json_field_names() {
        let state = SharedAuthState::new();
        state.set_user(claims());
        let json = state.snapshot().to_json();
        assert_eq!(json["isAuthenticated"], true);
        assert_eq!(json["isInitialized"], false);
        assert_eq!(json["user"]["id"], "u1");
        assert!(json["error"].is_null());
    }
}
