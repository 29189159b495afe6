//! Request and response bodies exchanged with the server.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::types::{EncryptedValue, MachineId, MachineKeyId, PublicKeyPem, WrappedKey};

/// `POST /auth/challenge`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeRequest {
    pub machine_name: String,
}

/// A nonce encrypted to the machine's registered key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChallengeResponse {
    pub challenge: String,
    pub challenge_id: String,
}

/// `POST /auth/verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub machine_name: String,
    pub challenge_id: String,
    pub signature: String,
}

#[derive(Clone, Default, Serialize, Deserialize)]
pub struct VerifyResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl std::fmt::Debug for VerifyResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyResponse")
            .field("success", &self.success)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// `POST /organizations/{org}/machines`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrolRequest {
    pub machine_id: MachineId,
    pub name: String,
    pub public_key: PublicKeyPem,
}

/// `POST .../secrets`. Replaces the whole scope when `replace_all` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushRequest {
    pub machine_key_id: MachineKeyId,
    pub variables: BTreeMap<String, EncryptedValue>,
    pub wrapped_keys: BTreeMap<MachineKeyId, WrappedKey>,
    pub replace_all: bool,
}

/// `GET .../secrets`. An empty `wrapped_key` means there is no key row for
/// the requesting machine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PullResponse {
    #[serde(default)]
    pub variables: BTreeMap<String, StoredVariable>,
    #[serde(default)]
    pub wrapped_key: WrappedKey,
}

/// One stored ciphertext. Older servers send the ciphertext as a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredVariableRepr")]
pub struct StoredVariable {
    pub value: EncryptedValue,
    pub created_at: String,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoredVariableRepr {
    Bare(String),
    Full {
        value: String,
        #[serde(default)]
        created_at: Option<String>,
    },
}

impl From<StoredVariableRepr> for StoredVariable {
    fn from(repr: StoredVariableRepr) -> Self {
        match repr {
            StoredVariableRepr::Bare(value) => Self {
                value,
                created_at: String::new(),
            },
            StoredVariableRepr::Full { value, created_at } => Self {
                value,
                created_at: created_at.unwrap_or_default(),
            },
        }
    }
}

/// List endpoints answer either with a bare array or with the array under a
/// named field.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum Listing<T> {
    Bare(Vec<T>),
    Wrapped {
        #[serde(
            alias = "orgs",
            alias = "organizations",
            alias = "machines",
            alias = "environments",
            alias = "data"
        )]
        items: Vec<T>,
    },
}

impl<T> Listing<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Wrapped { items } => items,
        }
    }
}
