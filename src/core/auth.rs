//! Challenge-response login.
//!
//! The server encrypts a random nonce to the machine's registered public key.
//! Only the holder of the private key can recover it, and the signature over
//! the recovered nonce proves possession without the key leaving the machine.

use tracing::debug;

use crate::core::cipher::MachineKey;
use crate::core::remote::VerifyResponse;
use crate::error::{RemoteError, Result};

/// Decrypt `challenge` and sign the recovered nonce.
///
/// # Errors
///
/// Returns `CipherError::AuthFailure` if the challenge was not encrypted to
/// this machine's key.
pub fn answer_challenge(key: &MachineKey, challenge: &str) -> Result<String> {
    let nonce = key.decrypt(challenge)?;
    debug!(nonce_len = nonce.len(), "challenge decrypted");
    Ok(key.sign(&nonce))
}

/// Extract the session token from a verify response.
///
/// # Errors
///
/// Returns `RemoteError::Rejected` when the server refused the signature or
/// answered without a token.
pub fn accept(response: VerifyResponse) -> Result<String> {
    if !response.success {
        let message = response
            .message
            .unwrap_or_else(|| "challenge verification failed".to_string());
        return Err(RemoteError::Rejected(message).into());
    }
    if response.token.is_empty() {
        return Err(RemoteError::Rejected("server returned no token".to_string()).into());
    }
    Ok(response.token)
}
