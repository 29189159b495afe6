//! RSA machine keys.
//!
//! Machine keys are RSA key-pairs. The private half lives on disk as PKCS#1
//! PEM; the public half is handed to the server as SPKI PEM. Master keys are
//! wrapped with RSA-OAEP (SHA-256, no label) and challenges are signed with
//! RSA-PSS over SHA-256.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::rngs::OsRng;
use rsa::pkcs1::{DecodeRsaPrivateKey, DecodeRsaPublicKey, EncodeRsaPrivateKey, LineEnding};
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePublicKey};
use rsa::pss::{Signature, SigningKey, VerifyingKey};
use rsa::signature::{RandomizedSigner, SignatureEncoding, Verifier};
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use tracing::{debug, trace};
use zeroize::Zeroizing;

use super::MasterKey;
use crate::core::constants;
use crate::core::types::{PublicKeyPem, WrappedKey};
use crate::error::{CipherError, Result};

/// PEM encodings of a freshly generated key-pair.
pub struct KeyPairPem {
    /// PKCS#1 private key.
    pub private_pem: Zeroizing<String>,
    /// SPKI public key.
    pub public_pem: PublicKeyPem,
}

impl std::fmt::Debug for KeyPairPem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPairPem")
            .field("private_pem", &"[redacted]")
            .field("public_pem", &self.public_pem)
            .finish()
    }
}

/// Generate a machine key-pair with the default modulus size.
pub fn generate_keypair() -> Result<KeyPairPem> {
    generate_keypair_with_bits(constants::RSA_KEY_BITS)
}

/// Generate a machine key-pair. `bits` must be at least 2048.
pub fn generate_keypair_with_bits(bits: usize) -> Result<KeyPairPem> {
    if bits < 2048 {
        return Err(CipherError::KeyGeneration(format!(
            "{} bit keys are too small, use at least 2048",
            bits
        ))
        .into());
    }

    debug!(bits, "generating rsa key-pair");
    let private = RsaPrivateKey::new(&mut OsRng, bits)
        .map_err(|e| CipherError::KeyGeneration(e.to_string()))?;
    let key = MachineKey { inner: private };

    Ok(KeyPairPem {
        private_pem: key.to_pem()?,
        public_pem: key.public_key_pem()?,
    })
}

/// Derive the public key PEM from a private key PEM.
pub fn extract_public_key(private_pem: &str) -> Result<PublicKeyPem> {
    MachineKey::from_pem(private_pem)?.public_key_pem()
}

/// Parse a public key in SPKI (`PUBLIC KEY`) or PKCS#1 (`RSA PUBLIC KEY`) PEM.
pub fn parse_public_key(public_pem: &str) -> Result<RsaPublicKey> {
    let pem = public_pem.trim();
    RsaPublicKey::from_public_key_pem(pem)
        .or_else(|_| RsaPublicKey::from_pkcs1_pem(pem))
        .map_err(|e| CipherError::InvalidKey(format!("public key: {}", e)).into())
}

/// RSA-OAEP encrypt arbitrary bytes to a public key, base64 encoded.
pub fn encrypt_to(public_pem: &str, data: &[u8]) -> Result<String> {
    let public = parse_public_key(public_pem)?;
    let ciphertext = public
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), data)
        .map_err(|e| CipherError::EncryptionFailed(e.to_string()))?;
    Ok(BASE64.encode(ciphertext))
}

/// Wrap a master key for one machine.
///
/// # Errors
///
/// Returns `CipherError::InvalidKey` if `public_pem` cannot be parsed.
pub fn wrap_master_key(public_pem: &str, master: &MasterKey) -> Result<WrappedKey> {
    trace!("wrapping master key");
    encrypt_to(public_pem, master.as_bytes())
}

/// Unwrap a master key with this machine's private key.
///
/// # Errors
///
/// Returns `CipherError::AuthFailure` when the key was not wrapped for this
/// machine.
pub fn unwrap_master_key(key: &MachineKey, wrapped: &str) -> Result<MasterKey> {
    let bytes = key.decrypt(wrapped)?;
    MasterKey::from_slice(&bytes)
}

/// Verify an RSA-PSS signature produced by [`MachineKey::sign`].
pub fn verify(public_pem: &str, message: &[u8], signature_b64: &str) -> Result<()> {
    let public = parse_public_key(public_pem)?;
    let raw = BASE64
        .decode(signature_b64.trim())
        .map_err(|e| CipherError::Malformed(format!("signature: {}", e)))?;
    let signature = Signature::try_from(raw.as_slice())
        .map_err(|e| CipherError::Malformed(format!("signature: {}", e)))?;

    VerifyingKey::<Sha256>::new(public)
        .verify(message, &signature)
        .map_err(|_| CipherError::AuthFailure("signature does not verify".to_string()).into())
}

/// A machine's RSA private key, parsed in memory only for the duration of an
/// operation. The underlying key zeroizes itself on drop.
pub struct MachineKey {
    inner: RsaPrivateKey,
}

impl MachineKey {
    /// Parse a PKCS#1 (or PKCS#8) private key PEM.
    pub fn from_pem(private_pem: &str) -> Result<Self> {
        let pem = private_pem.trim();
        let inner = RsaPrivateKey::from_pkcs1_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs8_pem(pem))
            .map_err(|e| CipherError::InvalidKey(format!("private key: {}", e)))?;
        Ok(Self { inner })
    }

    /// PKCS#1 PEM of the private key.
    pub fn to_pem(&self) -> Result<Zeroizing<String>> {
        self.inner
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| CipherError::InvalidKey(e.to_string()).into())
    }

    /// SPKI PEM of the matching public key.
    pub fn public_key_pem(&self) -> Result<PublicKeyPem> {
        self.inner
            .to_public_key()
            .to_public_key_pem(LineEnding::LF)
            .map_err(|e| CipherError::InvalidKey(e.to_string()).into())
    }

    /// RSA-OAEP decrypt a base64 ciphertext addressed to this key.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::AuthFailure` on padding mismatch.
    pub fn decrypt(&self, ciphertext_b64: &str) -> Result<Zeroizing<Vec<u8>>> {
        let raw = BASE64
            .decode(ciphertext_b64.trim())
            .map_err(|e| CipherError::Malformed(format!("wrapped key: {}", e)))?;
        self.inner
            .decrypt(Oaep::new::<Sha256>(), &raw)
            .map(Zeroizing::new)
            .map_err(|_| CipherError::AuthFailure("key was not wrapped for this machine".into()).into())
    }

    /// RSA-PSS sign `message` (hashed with SHA-256), base64 encoded.
    pub fn sign(&self, message: &[u8]) -> String {
        let signing_key = SigningKey::<Sha256>::new(self.inner.clone());
        let signature = signing_key.sign_with_rng(&mut OsRng, message);
        BASE64.encode(signature.to_bytes())
    }
}

impl std::fmt::Debug for MachineKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MachineKey").finish_non_exhaustive()
    }
}
