//! Type aliases for domain concepts.
//!
//! Provides semantic type aliases to make function signatures more descriptive.

/// Opaque machine identifier generated on first run.
pub type MachineId = String;

/// Server-assigned id of an enrolled machine's key row.
pub type MachineKeyId = String;

/// Organization identifier.
pub type OrgId = String;

/// A variable name (e.g. DATABASE_URL). Compared byte-for-byte.
pub type VariableKey = String;

/// base64(nonce || ciphertext || tag) of one variable value.
pub type EncryptedValue = String;

/// base64 RSA-OAEP ciphertext of a master key.
pub type WrappedKey = String;

/// PEM text of an RSA public key.
pub type PublicKeyPem = String;
