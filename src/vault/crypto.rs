//! Field-level encryption and identity hashing for the credential vault.
//!
//! Secrets are encrypted individually (AES-256-GCM, random nonce per field)
//! under a key derived from the application secret bound to a one-way hash
//! of the owning identity. The identity hash is also the only identity
//! material ever used in storage keys.

use aes_gcm::aead::{Aead, AeadCore, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use base64::Engine;
use sha2::{Digest, Sha256};
use thiserror::Error;

const NONCE_LEN: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("encryption failed")]
    Encrypt,
    #[error("decryption failed: wrong key or corrupted ciphertext")]
    Decrypt,
    #[error("ciphertext is malformed")]
    Malformed,
}

/// Deterministic one-way hash of a user identity (email or equivalent).
///
/// Identities are trimmed and lowercased first so `User@X` and `user@x`
/// share a vault.
pub fn identity_hash(identity: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(identity.trim().to_lowercase().as_bytes());
    hex::encode(hasher.finalize())
}

/// AES-256-GCM cipher for one user's credential fields.
#[derive(Clone)]
pub struct FieldCipher {
    cipher: Aes256Gcm,
}

impl FieldCipher {
    /// Derive the field key from the application secret and identity hash.
    pub fn new(app_secret: &str, identity_hash: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(app_secret.as_bytes());
        hasher.update(b":");
        hasher.update(identity_hash.as_bytes());
        let key_bytes = hasher.finalize();
        let key = Key::<Aes256Gcm>::from_slice(&key_bytes);
        Self {
            cipher: Aes256Gcm::new(key),
        }
    }

    /// Encrypt one field. Output is base64(nonce ‖ ciphertext).
    pub fn encrypt(&self, plaintext: &str) -> Result<String, CryptoError> {
        let nonce = Aes256Gcm::generate_nonce(&mut OsRng);
        let ciphertext = self
            .cipher
            .encrypt(&nonce, plaintext.as_bytes())
            .map_err(|_| CryptoError::Encrypt)?;

        let mut blob = nonce.to_vec();
        blob.extend_from_slice(&ciphertext);
        Ok(base64::engine::general_purpose::STANDARD.encode(blob))
    }

    /// Decrypt one field produced by [`FieldCipher::encrypt`].
    pub fn decrypt(&self, encoded: &str) -> Result<String, CryptoError> {
        let blob = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|_| CryptoError::Malformed)?;
        if blob.len() <= NONCE_LEN {
            return Err(CryptoError::Malformed);
        }

        let (nonce, ciphertext) = blob.split_at(NONCE_LEN);
        let plaintext = self
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::Decrypt)?;
        String::from_utf8(plaintext).map_err(|_| CryptoError::Malformed)
    }
}
