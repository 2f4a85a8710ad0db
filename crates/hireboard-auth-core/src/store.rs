//! Session store: the persisted token and encrypted claims snapshot

use hireboard_types::Claims;

use crate::{ClaimsCipher, SessionConfig, SessionError, SessionStorage};

/// Both persisted halves of a session, as read from storage
#[derive(Clone, PartialEq, Eq)]
pub struct StoredSession {
    /// Raw bearer token
    pub token: String,
    /// Encrypted claims snapshot
    pub ciphertext: String,
}

impl std::fmt::Debug for StoredSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredSession")
            .field("token_len", &self.token.len())
            .field("ciphertext_len", &self.ciphertext.len())
            .finish()
    }
}

/// Durable store for the bearer token and its encrypted claims.
///
/// The two values live under independent keys; a session only exists when
/// both are present.
#[derive(Debug)]
pub struct SessionStore<S: SessionStorage> {
    storage: S,
    cipher: ClaimsCipher,
    token_key: String,
    claims_key: String,
}

impl<S: SessionStorage> SessionStore<S> {
    /// Create a store over `storage` using the configured secret and keys
    pub fn new(storage: S, config: &SessionConfig) -> Self {
        Self {
            storage,
            cipher: ClaimsCipher::new(&config.secret_key),
            token_key: config.token_key.clone(),
            claims_key: config.claims_key.clone(),
        }
    }

    /// Underlying storage backend
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Claims cipher used by this store
    pub fn cipher(&self) -> &ClaimsCipher {
        &self.cipher
    }

    /// Persist a token and the claims decoded from it
    pub fn write(&self, token: &str, claims: &Claims) -> Result<(), SessionError> {
        let ciphertext = self.cipher.encrypt(claims)?;

        let result = self
            .storage
            .set(&self.claims_key, &ciphertext)
            .and_then(|()| self.storage.set(&self.token_key, token));

        if let Err(e) = &result {
            tracing::error!("Failed to persist session: {}", e);
            self.clear();
        }
        result
    }

    /// Read both halves of the session; `None` unless both are present
    pub fn read(&self) -> Option<StoredSession> {
        let token = self.read_key(&self.token_key)?;
        let ciphertext = self.read_key(&self.claims_key)?;
        Some(StoredSession { token, ciphertext })
    }

    /// Raw token, when one is stored
    pub fn token(&self) -> Option<String> {
        self.read_key(&self.token_key)
    }

    /// Decrypt the claims snapshot of a stored session
    pub fn decrypt_claims(&self, session: &StoredSession) -> Result<Claims, SessionError> {
        self.cipher.decrypt(&session.ciphertext)
    }

    /// Remove both keys. Idempotent; backend failures are logged, not returned.
    pub fn clear(&self) {
        for key in [&self.claims_key, &self.token_key] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!("Failed to remove session key '{}': {}", key, e);
            }
        }
    }

    fn read_key(&self, key: &str) -> Option<String> {
        match self.storage.get(key) {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                tracing::warn!("Failed to read session key '{}': {}", key, e);
                None
            }
        }
    }
}
