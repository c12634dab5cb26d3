//! At-rest encryption for repository access tokens.
//!
//! Tokens are sealed with AES-256-GCM under a server-wide key. The stored
//! form is `base64(nonce || ciphertext)` so every value carries its own
//! random nonce.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::CoreError;

/// Required key length in bytes.
pub const KEY_LEN: usize = 32;

/// AES-GCM nonce length in bytes.
const NONCE_LEN: usize = 12;

/// Seals and opens repository tokens.
#[derive(Clone)]
pub struct TokenCipher {
    cipher: Aes256Gcm,
}

impl std::fmt::Debug for TokenCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCipher").finish_non_exhaustive()
    }
}

impl TokenCipher {
    pub fn new(key: &[u8; KEY_LEN]) -> Self {
        Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key)),
        }
    }

    /// Build a cipher from a base64-encoded 32-byte key.
    pub fn from_base64(encoded: &str) -> Result<Self, CoreError> {
        let bytes = STANDARD.decode(encoded.trim()).map_err(|e| {
            CoreError::Validation(format!("Encryption key is not valid base64: {e}"))
        })?;
        let key: [u8; KEY_LEN] = bytes.try_into().map_err(|b: Vec<u8>| {
            CoreError::Validation(format!(
                "Encryption key must be {KEY_LEN} bytes, got {}",
                b.len()
            ))
        })?;
        Ok(Self::new(&key))
    }

    /// Encrypt a token for storage.
    pub fn seal(&self, plaintext: &str) -> Result<String, CoreError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CoreError::Internal("Token encryption failed".to_string()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(STANDARD.encode(sealed))
    }

    /// Decrypt a stored token.
    pub fn open(&self, sealed: &str) -> Result<String, CoreError> {
        let raw = STANDARD
            .decode(sealed)
            .map_err(|_| CoreError::Internal("Stored token is not valid base64".to_string()))?;
        if raw.len() <= NONCE_LEN {
            return Err(CoreError::Internal("Stored token is truncated".to_string()));
        }
        let (nonce, ciphertext) = raw.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CoreError::Internal("Stored token could not be decrypted".to_string()))?;
        String::from_utf8(plaintext)
            .map_err(|_| CoreError::Internal("Stored token is not valid UTF-8".to_string()))
    }
}
