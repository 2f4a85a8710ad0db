//! Session service - ties together the store, token validation and auth state

use hireboard_types::Claims;

use crate::{
    AuthView, RehydrationOutcome, Rehydrator, SessionConfig, SessionError, SessionStorage,
    SessionStore, SharedAuthState, TokenValidator,
};

/// Session service
///
/// Provides unified interface for:
/// - Startup rehydration of a persisted session
/// - Login (persist token and encrypted claims, publish the user)
/// - Logout (storage first, then in-memory state)
/// - Bearer header construction for API calls
pub struct SessionService<S: SessionStorage> {
    store: SessionStore<S>,
    validator: TokenValidator,
    state: SharedAuthState,
}

impl<S: SessionStorage> SessionService<S> {
    /// Create a new session service
    pub fn new(storage: S, config: &SessionConfig, state: SharedAuthState) -> Self {
        if config.uses_default_secret() {
            tracing::warn!("Using the built-in fallback secret for session encryption");
        }

        Self {
            store: SessionStore::new(storage, config),
            validator: TokenValidator::new(config.expiry_policy),
            state,
        }
    }

    /// Replace the token validator (custom clock or policy)
    #[must_use]
    pub fn with_validator(mut self, validator: TokenValidator) -> Self {
        self.validator = validator;
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Session store
    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    /// Token validator
    pub fn validator(&self) -> &TokenValidator {
        &self.validator
    }

    /// Writable auth state handle
    pub fn state(&self) -> &SharedAuthState {
        &self.state
    }

    /// Read-only auth state for views
    pub fn view(&self) -> AuthView {
        self.state.view()
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Restore a persisted session. Only the first call runs.
    pub fn rehydrate(&self) -> Result<RehydrationOutcome, SessionError> {
        Rehydrator::start(&self.store, &self.validator, &self.state)
    }

    /// Sign in with a token issued by the API
    pub fn login(&self, token: &str) -> Result<Claims, SessionError> {
        let claims = self.validator.check(token).map_err(|e| {
            tracing::debug!("Login token rejected: {}", e);
            self.state.set_error("Login failed: Invalid server response.");
            e
        })?;

        self.store.write(token, &claims).map_err(|e| {
            self.state.set_error("Login failed. Something went wrong.");
            e
        })?;

        self.state.set_user(claims.clone());
        tracing::info!(user_id = claims.id().unwrap_or("unknown"), "Login successful");
        Ok(claims)
    }

    /// Record a failed login attempt for the login view
    pub fn record_login_failure(&self, message: impl Into<String>) {
        self.state.set_error(message);
    }

    /// Sign out. Storage is cleared before state so a reload cannot rehydrate.
    pub fn logout(&self) {
        self.store.clear();
        self.state.logout();
        tracing::info!("Logout successful");
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Authenticated in memory and both halves still in storage
    pub fn has_persisted_session(&self) -> bool {
        self.state.view().is_authenticated() && self.store.read().is_some()
    }

    /// `Authorization` header value for API calls
    pub fn authorization_header(&self) -> Option<String> {
        self.store.token().map(|token| format!("Bearer {token}"))
    }
}

impl<S: SessionStorage> std::fmt::Debug for SessionService<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService")
            .field("validator", &self.validator)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ExpiryPolicy, FixedClock, Gate, MemoryStorage};
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use serde_json::{json, Value};
    use std::sync::Arc;

    const NOW: i64 = 1_750_000_000;

    fn token_with(payload: &Value) -> String {
        let body = URL_SAFE_NO_PAD.encode(serde_json::to_vec(payload).unwrap());
        format!("eyJhbGciOiJIUzI1NiJ9.{body}.sig")
    }

    fn service() -> SessionService<MemoryStorage> {
        SessionService::new(
            MemoryStorage::new(),
            &SessionConfig::new("test-secret"),
            SharedAuthState::new(),
        )
        .with_validator(TokenValidator::with_clock(
            ExpiryPolicy::AllowMissing,
            Arc::new(FixedClock(NOW)),
        ))
    }

    #[test]
    fn test_login_persists_and_publishes() {
        let service = service();
        let token = token_with(&json!({"id": "u1", "role": "admin", "exp": NOW + 60}));

        let claims = service.login(&token).unwrap();

        assert_eq!(claims.id(), Some("u1"));
        assert_eq!(service.view().user(), Some(claims.clone()));
        let stored = service.store().read().unwrap();
        assert_eq!(stored.token, token);
        assert_eq!(service.store().decrypt_claims(&stored).unwrap(), claims);
        assert!(service.has_persisted_session());
    }

    #[test]
    fn test_login_rejects_expired_token() {
        let service = service();
        let token = token_with(&json!({"id": "u1", "exp": NOW - 60}));

        assert_eq!(service.login(&token), Err(SessionError::TokenExpired));
        assert!(service.store().read().is_none());
        assert!(!service.view().is_authenticated());
        assert!(service.view().error().is_some());
    }

    #[test]
    fn test_login_rejects_malformed_token() {
        let service = service();
        assert_eq!(service.login("not-a-jwt"), Err(SessionError::InvalidToken));
        assert!(service.store().storage().is_empty());
    }

    #[test]
    fn test_logout_clears_storage_and_state() {
        let service = service();
        service.rehydrate().unwrap();
        service
            .login(&token_with(&json!({"id": "u1", "exp": NOW + 60})))
            .unwrap();

        service.logout();

        assert!(service.store().read().is_none());
        assert!(!service.view().is_authenticated());
        assert!(!service.has_persisted_session());
        assert_eq!(service.view().gate(), Gate::RedirectToLogin);
    }

    #[test]
    fn test_persisted_session_requires_storage() {
        let service = service();
        service
            .login(&token_with(&json!({"id": "u1", "exp": NOW + 60})))
            .unwrap();

        // Storage wiped behind the app's back (another tab logged out)
        service.store().clear();
        assert!(service.view().is_authenticated());
        assert!(!service.has_persisted_session());
    }

    #[test]
    fn test_authorization_header() {
        let service = service();
        assert_eq!(service.authorization_header(), None);

        let token = token_with(&json!({"id": "u1"}));
        service.login(&token).unwrap();
        assert_eq!(
            service.authorization_header(),
            Some(format!("Bearer {token}"))
        );
    }

    #[test]
    fn test_record_login_failure() {
        let service = service();
        service.record_login_failure("Login failed. Please check your credentials.");
        assert_eq!(
            service.view().error().as_deref(),
            Some("Login failed. Please check your credentials.")
        );
    }

    #[test]
    fn test_rehydrate_only_once() {
        let service = service();
        assert_eq!(service.rehydrate(), Ok(RehydrationOutcome::NoSession));
        assert_eq!(service.rehydrate(), Err(SessionError::AlreadyInitialized));
    }
}
