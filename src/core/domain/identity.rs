//! Machine identity.
//!
//! The non-secret half of a machine's local state, persisted as
//! `config.json`. The private key is stored beside it and is never part of
//! this struct.

use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::constants;
use crate::core::types::{MachineId, OrgId};

/// Contents of `config.json`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MachineIdentity {
    /// Short opaque id, stable across restarts.
    pub machine_id: MachineId,
    /// Human readable device name shown in machine listings.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub machine_name: String,
    /// Base URL of the server.
    pub server_url: String,
    /// Bearer session token, empty when logged out.
    #[serde(default)]
    pub jwt_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_org_id: Option<OrgId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_environment: Option<String>,
}

impl MachineIdentity {
    /// Fresh identity with a newly generated machine id.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            machine_id: generate_machine_id(),
            machine_name: whoami::devicename(),
            server_url: server_url.into(),
            jwt_token: String::new(),
            active_org_id: None,
            default_environment: None,
        }
    }

    /// Display name, falling back to the machine id.
    pub fn name(&self) -> &str {
        if self.machine_name.is_empty() {
            &self.machine_id
        } else {
            &self.machine_name
        }
    }

    /// Session token, if logged in.
    pub fn token(&self) -> Option<&str> {
        if self.jwt_token.is_empty() {
            None
        } else {
            Some(&self.jwt_token)
        }
    }

    /// Default environment for scope operations.
    pub fn environment(&self) -> &str {
        self.default_environment
            .as_deref()
            .unwrap_or(constants::DEFAULT_ENVIRONMENT)
    }
}

impl std::fmt::Debug for MachineIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MachineIdentity")
            .field("machine_id", &self.machine_id)
            .field("machine_name", &self.machine_name)
            .field("server_url", &self.server_url)
            .field("logged_in", &self.token().is_some())
            .field("active_org_id", &self.active_org_id)
            .field("default_environment", &self.default_environment)
            .finish()
    }
}

/// `m-` followed by lowercase alphanumerics.
fn generate_machine_id() -> MachineId {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(constants::MACHINE_ID_LEN)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect();
    format!("m-{}", suffix)
}
