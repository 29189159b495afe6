//! Directory rows returned by the server.

use serde::{Deserialize, Serialize};

use crate::core::types::{MachineId, MachineKeyId, OrgId, PublicKeyPem};

/// A machine enrolled in an organization. Its public key is a wrap target
/// for every push to that organization's scopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrolledMachine {
    #[serde(alias = "id")]
    pub machine_key_id: MachineKeyId,
    pub machine_id: MachineId,
    #[serde(default)]
    pub name: String,
    #[serde(alias = "public_key_pem")]
    pub public_key: PublicKeyPem,
}

/// The caller's membership in one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgMembership {
    #[serde(alias = "id")]
    pub org_id: OrgId,
    #[serde(default, alias = "name")]
    pub org_name: String,
    #[serde(default)]
    pub role: String,
}

impl std::fmt::Display for OrgMembership {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.org_name.is_empty() {
            write!(f, "{}", self.org_id)
        } else {
            write!(f, "{} ({})", self.org_name, self.org_id)
        }
    }
}

/// One `(project, environment)` pair with stored secrets.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectEnvironment {
    #[serde(alias = "project_name")]
    pub project: String,
    pub environment: String,
}
