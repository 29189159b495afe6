//! Push and pull.
//!
//! Every push generates a fresh master key, re-encrypts the full variable
//! set under it and wraps it for every machine currently enrolled in the
//! org. The server swaps the scope's `(variables, wrapped_keys)` pair in one
//! step, so readers only ever see the output of a single push.

use std::collections::BTreeMap;

use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::Agent;
use crate::core::cipher::{self, MasterKey};
use crate::core::domain::{EnrolledMachine, Scope, ScopeReport, Secret, Secrets, WrapFailure};
use crate::core::remote::{Api, PullResponse, PushRequest};
use crate::core::types::{EncryptedValue, MachineKeyId, VariableKey, WrappedKey};
use crate::error::{CipherError, Result, ScopeError};

impl<A: Api> Agent<A> {
    /// Store `vars` in `scope`.
    ///
    /// With `replace_all` the scope ends up holding exactly `vars`. Without
    /// it the current contents are pulled first and `vars` wins on common
    /// keys. Either way the whole scope is re-encrypted under a new master
    /// key and replaced on the server.
    ///
    /// # Errors
    ///
    /// - `ScopeError::NoActiveOrg` / `ScopeError::NotEnrolled` from the preamble
    /// - `CipherError::AuthFailure` if merging and the existing scope is not
    ///   readable by this machine
    /// - `ScopeError::NoRecipients` if the key could not be wrapped for anyone
    pub async fn push(
        &self,
        scope: &Scope,
        vars: &BTreeMap<VariableKey, String>,
        replace_all: bool,
    ) -> Result<ScopeReport> {
        let (machines, me) = self.preamble(scope).await?;

        let mut merged: BTreeMap<VariableKey, Zeroizing<String>> = BTreeMap::new();
        if !replace_all {
            let response = self
                .remote(self.api.pull_secrets(scope, None, &me.machine_key_id))
                .await;
            match response.and_then(|r| self.open_scope(scope, r)) {
                Ok(existing) => merged = existing.values(),
                Err(e) if e.is_not_found() => debug!(%scope, "nothing stored yet"),
                Err(e) => return Err(e),
            }
        }
        for (key, value) in vars {
            merged.insert(key.clone(), Zeroizing::new(value.clone()));
        }
        self.checkpoint()?;

        let master = MasterKey::generate();
        let (wrapped_keys, mut report) = distribute(&master, &machines)?;
        let variables = seal(&master, &merged)?;
        drop(master);
        report.variables = variables.len();

        let request = PushRequest {
            machine_key_id: me.machine_key_id,
            variables,
            wrapped_keys,
            replace_all: true,
        };
        self.remote(self.api.push_secrets(scope, &request)).await?;

        info!(
            %scope,
            variables = report.variables,
            machines = report.wrapped_for.len(),
            skipped = report.skipped.len(),
            "scope pushed"
        );
        Ok(report)
    }

    /// Decrypt every variable in `scope`.
    ///
    /// # Errors
    ///
    /// - `ScopeError::NotFound` if nothing is stored
    /// - `CipherError::AuthFailure` if the scope's key is not wrapped for
    ///   this machine
    /// - `ScopeError::Corruption` if any value fails to decrypt
    pub async fn pull(&self, scope: &Scope) -> Result<Secrets> {
        let (_, me) = self.preamble(scope).await?;
        let response = self
            .remote(self.api.pull_secrets(scope, None, &me.machine_key_id))
            .await?;
        let secrets = self.open_scope(scope, response)?;
        debug!(%scope, variables = secrets.len(), "scope pulled");
        Ok(secrets)
    }

    /// Decrypt one variable.
    pub async fn pull_key(&self, scope: &Scope, key: &str) -> Result<Zeroizing<String>> {
        let (_, me) = self.preamble(scope).await?;
        let response = self
            .remote(self.api.pull_secrets(scope, Some(key), &me.machine_key_id))
            .await?;
        let secrets = self.open_scope(scope, response)?;

        secrets
            .get(key)
            .map(|v| Zeroizing::new(v.to_string()))
            .ok_or_else(|| ScopeError::NotFound(format!("{} in {}", key, scope)).into())
    }

    /// Unwrap the scope's master key with this machine's private key.
    pub(super) fn scope_master_key(
        &self,
        scope: &Scope,
        response: &PullResponse,
    ) -> Result<MasterKey> {
        if response.wrapped_key.is_empty() {
            if response.variables.is_empty() {
                return Err(ScopeError::NotFound(scope.to_string()).into());
            }
            return Err(CipherError::AuthFailure(format!(
                "{} holds no key for this machine, run sync from an enrolled machine",
                scope
            ))
            .into());
        }
        let private_key = self.store.private_key()?;
        cipher::unwrap_master_key(&private_key, &response.wrapped_key)
    }

    pub(super) fn open_scope(&self, scope: &Scope, response: PullResponse) -> Result<Secrets> {
        let master = self.scope_master_key(scope, &response)?;

        response
            .variables
            .into_iter()
            .map(|(name, stored)| -> Result<(VariableKey, Secret)> {
                let value = master
                    .decrypt_string(&stored.value)
                    .map_err(|e| ScopeError::Corruption(format!("{}: {}", name, e)))?;
                Ok((name, Secret::new(value, stored.created_at)))
            })
            .collect()
    }
}

/// Wrap `master` for every machine, in directory order.
///
/// Machines whose key cannot be used are skipped and reported.
pub(super) fn distribute(
    master: &MasterKey,
    machines: &[EnrolledMachine],
) -> Result<(BTreeMap<MachineKeyId, WrappedKey>, ScopeReport)> {
    let mut wrapped = BTreeMap::new();
    let mut report = ScopeReport::default();

    for machine in machines {
        match cipher::wrap_master_key(&machine.public_key, master) {
            Ok(key) => {
                wrapped.insert(machine.machine_key_id.clone(), key);
                report.wrapped_for.push(machine.machine_key_id.clone());
            }
            Err(e) => {
                warn!(
                    machine_id = %machine.machine_id,
                    machine_key_id = %machine.machine_key_id,
                    error = %e,
                    "skipping machine, cannot wrap master key"
                );
                report.skipped.push(WrapFailure {
                    machine_id: machine.machine_id.clone(),
                    machine_key_id: machine.machine_key_id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    if wrapped.is_empty() {
        return Err(ScopeError::NoRecipients.into());
    }
    Ok((wrapped, report))
}

/// Encrypt each value under `master`.
pub(super) fn seal(
    master: &MasterKey,
    vars: &BTreeMap<VariableKey, Zeroizing<String>>,
) -> Result<BTreeMap<VariableKey, EncryptedValue>> {
    vars.iter()
        .map(|(key, value)| -> Result<(VariableKey, EncryptedValue)> {
            Ok((key.clone(), master.encrypt(value.as_bytes())?))
        })
        .collect()
}
