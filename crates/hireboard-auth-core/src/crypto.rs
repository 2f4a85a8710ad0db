//! Symmetric encryption of the cached claims snapshot
//!
//! The claims decoded at login are stored next to the token so a reload can
//! restore the signed-in user without another round trip. They are sealed
//! with AES-256-GCM under a key derived from the configured secret, so a
//! tampered or foreign snapshot fails authentication instead of parsing.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::{engine::general_purpose::STANDARD, Engine};
use hireboard_types::Claims;
use serde::{de::DeserializeOwned, Serialize};
use sha2::{Digest, Sha256};

use crate::SessionError;

/// Nonce size for AES-256-GCM (12 bytes / 96 bits)
const NONCE_SIZE: usize = 12;

/// Prefix marking the ciphertext format
pub const CIPHERTEXT_PREFIX: &str = "aes256:";

/// Claims cipher keyed by a fixed secret.
///
/// Output format: `aes256:<base64(nonce || ciphertext)>`.
#[derive(Clone)]
pub struct ClaimsCipher {
    cipher: Aes256Gcm,
}

impl ClaimsCipher {
    /// Create a cipher from a secret string of any length.
    ///
    /// The 256-bit key is the SHA-256 digest of the secret.
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let digest = Sha256::digest(secret.as_ref());
        let key = Key::<Aes256Gcm>::clone_from_slice(&digest);
        Self {
            cipher: Aes256Gcm::new(&key),
        }
    }

    /// Encrypt claims into a storable string
    pub fn encrypt(&self, claims: &Claims) -> Result<String, SessionError> {
        self.encrypt_json(claims)
    }

    /// Decrypt a stored string back into claims
    pub fn decrypt(&self, ciphertext: &str) -> Result<Claims, SessionError> {
        let value: serde_json::Value = self.decrypt_json(ciphertext)?;
        Ok(Claims::try_from(value)?)
    }

    /// Encrypt any JSON-serializable value
    pub fn encrypt_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, SessionError> {
        let plaintext = serde_json::to_vec(value).map_err(|e| {
            tracing::error!("Failed to serialize claims: {}", e);
            SessionError::MalformedClaims(e.to_string())
        })?;

        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let sealed = self
            .cipher
            .encrypt(&nonce, plaintext.as_slice())
            .map_err(|e| SessionError::Encryption(e.to_string()))?;

        let mut combined = Vec::with_capacity(NONCE_SIZE + sealed.len());
        combined.extend_from_slice(&nonce);
        combined.extend_from_slice(&sealed);

        Ok(format!("{CIPHERTEXT_PREFIX}{}", STANDARD.encode(&combined)))
    }

    /// Decrypt and deserialize a value produced by [`Self::encrypt_json`]
    pub fn decrypt_json<T: DeserializeOwned>(&self, ciphertext: &str) -> Result<T, SessionError> {
        let encoded = ciphertext.strip_prefix(CIPHERTEXT_PREFIX).ok_or_else(|| {
            tracing::debug!("Ciphertext missing format prefix");
            SessionError::Decryption
        })?;

        let combined = STANDARD.decode(encoded).map_err(|e| {
            tracing::debug!("Ciphertext is not valid base64: {}", e);
            SessionError::Decryption
        })?;

        if combined.len() < NONCE_SIZE {
            tracing::debug!("Ciphertext too short: {} bytes", combined.len());
            return Err(SessionError::Decryption);
        }

        let (nonce_bytes, sealed) = combined.split_at(NONCE_SIZE);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce_bytes), sealed)
            .map_err(|_| {
                tracing::debug!("Ciphertext failed authentication");
                SessionError::Decryption
            })?;

        serde_json::from_slice(&plaintext).map_err(|e| SessionError::MalformedClaims(e.to_string()))
    }

    /// Check if a string looks like output of this cipher
    pub fn is_encrypted(value: &str) -> bool {
        value.starts_with(CIPHERTEXT_PREFIX)
    }
}

impl std::fmt::Debug for ClaimsCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClaimsCipher")
            .field("algorithm", &"AES-256-GCM")
            .finish_non_exhaustive()
    }
}
