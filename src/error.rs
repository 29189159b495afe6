//! Error types.
//!
//! Each concern owns an error enum; [`Error`] wraps them all. Callers that
//! need to branch on the failure class use [`Error::kind`].

use std::time::Duration;

use thiserror::Error;

/// Identity store failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("not initialized: no identity found in {0}")]
    NotInitialized(String),

    #[error("incomplete identity in {dir}: {missing} is missing")]
    Incomplete { dir: String, missing: String },

    #[error("unable to determine home directory")]
    NoHomeDir,

    #[error("failed to read identity file: {0}")]
    ReadFailed(#[source] std::io::Error),

    #[error("failed to write identity file: {0}")]
    WriteFailed(#[source] std::io::Error),

    #[error("invalid identity file format: {0}")]
    InvalidFormat(String),
}

/// Cryptographic failures.
#[derive(Error, Debug)]
pub enum CipherError {
    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("key generation failed: {0}")]
    KeyGeneration(String),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// OAEP padding or GCM tag mismatch. The key in hand cannot open the data.
    #[error("authentication failed: {0}")]
    AuthFailure(String),

    #[error("malformed ciphertext: {0}")]
    Malformed(String),
}

/// Failures talking to the server.
#[derive(Error, Debug)]
pub enum RemoteError {
    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("authentication rejected: {0}")]
    Rejected(String),
}

impl RemoteError {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}

/// Failures resolving or operating on a secret scope.
#[derive(Error, Debug)]
pub enum ScopeError {
    #[error("no active organization selected")]
    NoActiveOrg,

    #[error("machine {machine_id} is not enrolled in organization {org_id}")]
    NotEnrolled { machine_id: String, org_id: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("no enrolled machine could receive the master key")]
    NoRecipients,

    #[error("corrupted scope data: {0}")]
    Corruption(String),
}

/// Top-level error type.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Cipher(#[from] CipherError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error("operation cancelled")]
    Cancelled,

    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// Semantic failure class, independent of which layer raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotInitialized,
    NoActiveOrg,
    NotEnrolled,
    AuthFailure,
    PermissionDenied,
    RemoteError,
    NotFound,
    NoRecipients,
    Corruption,
    InvalidKey,
    InvalidInput,
    Cancelled,
    Timeout,
    Io,
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Store(StoreError::NotInitialized(_) | StoreError::Incomplete { .. }) => {
                ErrorKind::NotInitialized
            }
            Self::Store(StoreError::InvalidFormat(_)) => ErrorKind::Corruption,
            Self::Store(_) => ErrorKind::Io,
            Self::Cipher(CipherError::AuthFailure(_)) => ErrorKind::AuthFailure,
            Self::Cipher(CipherError::InvalidKey(_)) => ErrorKind::InvalidKey,
            Self::Cipher(CipherError::Malformed(_)) => ErrorKind::Corruption,
            Self::Cipher(_) => ErrorKind::Io,
            Self::Remote(RemoteError::Rejected(_)) => ErrorKind::AuthFailure,
            Self::Remote(RemoteError::Status { status, .. }) => match status {
                401 => ErrorKind::AuthFailure,
                403 => ErrorKind::PermissionDenied,
                404 => ErrorKind::NotFound,
                _ => ErrorKind::RemoteError,
            },
            Self::Remote(_) => ErrorKind::RemoteError,
            Self::Scope(ScopeError::NoActiveOrg) => ErrorKind::NoActiveOrg,
            Self::Scope(ScopeError::NotEnrolled { .. }) => ErrorKind::NotEnrolled,
            Self::Scope(ScopeError::NotFound(_)) => ErrorKind::NotFound,
            Self::Scope(ScopeError::NoRecipients) => ErrorKind::NoRecipients,
            Self::Scope(ScopeError::Corruption(_)) => ErrorKind::Corruption,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Cancelled => ErrorKind::Cancelled,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Io(_) | Self::Prompt(_) => ErrorKind::Io,
            Self::Json(_) => ErrorKind::Corruption,
        }
    }

    /// Whether the error means "nothing stored here yet".
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

pub type Result<T> = std::result::Result<T, Error>;
