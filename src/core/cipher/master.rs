//! Symmetric master keys.
//!
//! Every variable of a scope is sealed with AES-256-GCM under one master key.
//! The stored form is `base64(nonce || ciphertext || tag)` with a fresh
//! 12-byte nonce per value.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::rngs::OsRng;
use rand::RngCore;
use tracing::trace;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::core::types::EncryptedValue;
use crate::error::{CipherError, Result};

/// Master key length in bytes (AES-256).
pub const MASTER_KEY_LEN: usize = 32;

/// AES-GCM nonce length in bytes.
pub const NONCE_LEN: usize = 12;

/// AES-GCM tag length in bytes.
pub const TAG_LEN: usize = 16;

/// A 256-bit symmetric key. Never persisted; wiped when dropped.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct MasterKey([u8; MASTER_KEY_LEN]);

impl MasterKey {
    /// Draw a fresh key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; MASTER_KEY_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Build a key from unwrapped bytes.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::Malformed` if `bytes` is not 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let array: [u8; MASTER_KEY_LEN] = bytes.try_into().map_err(|_| {
            CipherError::Malformed(format!(
                "master key must be {} bytes, got {}",
                MASTER_KEY_LEN,
                bytes.len()
            ))
        })?;
        Ok(Self(array))
    }

    /// Raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Seal one value.
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<EncryptedValue> {
        let cipher = Aes256Gcm::new_from_slice(&self.0)
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

        let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        trace!(plaintext_len = plaintext.len(), "sealed value");
        Ok(BASE64.encode(combined))
    }

    /// Open one value sealed by [`MasterKey::encrypt`].
    ///
    /// # Errors
    ///
    /// Returns `CipherError::AuthFailure` on tag mismatch and
    /// `CipherError::Malformed` if the blob is not well-formed.
    pub fn decrypt(&self, blob: &str) -> Result<Zeroizing<Vec<u8>>> {
        let combined = BASE64
            .decode(blob.trim())
            .map_err(|e| CipherError::Malformed(format!("value: {}", e)))?;

        if combined.len() < NONCE_LEN + TAG_LEN {
            return Err(CipherError::Malformed("value too short".to_string()).into());
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let cipher = Aes256Gcm::new_from_slice(&self.0)
            .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;

        cipher
            .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
            .map(Zeroizing::new)
            .map_err(|_| CipherError::AuthFailure("value tag mismatch".to_string()).into())
    }

    /// Open a value and require it to be UTF-8 text.
    pub fn decrypt_string(&self, blob: &str) -> Result<Zeroizing<String>> {
        let bytes = self.decrypt(blob)?;
        let text = std::str::from_utf8(&bytes)
            .map_err(|e| CipherError::Malformed(format!("value is not utf-8: {}", e)))?;
        Ok(Zeroizing::new(text.to_string()))
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey([redacted])")
    }
}
