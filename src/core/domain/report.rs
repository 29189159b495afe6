//! Outcome summaries for key-distributing operations.

use crate::core::domain::Scope;
use crate::core::types::{MachineId, MachineKeyId};

/// A machine the master key could not be wrapped for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrapFailure {
    pub machine_id: MachineId,
    pub machine_key_id: MachineKeyId,
    pub reason: String,
}

/// Result of a push or a key sync on one scope.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeReport {
    /// Number of variables stored in the scope after the operation.
    pub variables: usize,
    /// Key rows that received a wrapped master key, in directory order.
    pub wrapped_for: Vec<MachineKeyId>,
    /// Machines skipped because wrapping failed.
    pub skipped: Vec<WrapFailure>,
}

/// Result of syncing keys across every scope of an organization.
#[derive(Debug, Default)]
pub struct SyncAllReport {
    pub synced: Vec<(Scope, ScopeReport)>,
    pub failed: Vec<(Scope, String)>,
}
