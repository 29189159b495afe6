//! Key re-distribution after the fleet changes.
//!
//! A sync keeps the scope's master key and ciphertexts and only rebuilds the
//! wrapped-key map for the current machine list. Newly enrolled machines
//! gain access, removed ones stop receiving the key.

use std::collections::BTreeMap;

use tracing::{info, warn};

use super::secrets::distribute;
use super::Agent;
use crate::core::domain::{Scope, ScopeReport, SyncAllReport};
use crate::core::remote::{Api, PushRequest};
use crate::error::{Error, Result};

impl<A: Api> Agent<A> {
    /// Re-wrap the scope's master key for every enrolled machine.
    ///
    /// Stored ciphertexts are sent back unchanged.
    ///
    /// # Errors
    ///
    /// - `ScopeError::NotFound` if nothing is stored
    /// - `CipherError::AuthFailure` if this machine cannot unwrap the key
    /// - `ScopeError::NoRecipients` if no machine could receive it
    pub async fn sync_keys(&self, scope: &Scope) -> Result<ScopeReport> {
        let (machines, me) = self.preamble(scope).await?;
        let response = self
            .remote(self.api.pull_secrets(scope, None, &me.machine_key_id))
            .await?;

        let master = self.scope_master_key(scope, &response)?;
        let (wrapped_keys, mut report) = distribute(&master, &machines)?;
        drop(master);
        self.checkpoint()?;

        let variables: BTreeMap<_, _> = response
            .variables
            .into_iter()
            .map(|(name, stored)| (name, stored.value))
            .collect();
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
            machines = report.wrapped_for.len(),
            skipped = report.skipped.len(),
            "keys synced"
        );
        Ok(report)
    }

    /// Sync every `(project, environment)` stored under `org_id`.
    ///
    /// A failing scope is logged and reported; the rest still run.
    /// Cancellation and timeouts stop the whole run.
    pub async fn sync_all(&self, org_id: &str) -> Result<SyncAllReport> {
        let pairs = self
            .remote(self.api.list_project_environments(org_id))
            .await?;
        let mut report = SyncAllReport::default();

        for pair in pairs {
            let scope = Scope::new(Some(org_id), pair.project, pair.environment);
            match self.sync_keys(&scope).await {
                Ok(outcome) => report.synced.push((scope, outcome)),
                Err(e @ (Error::Cancelled | Error::Timeout(_))) => return Err(e),
                Err(e) => {
                    warn!(%scope, error = %e, "sync failed");
                    report.failed.push((scope, e.to_string()));
                }
            }
        }

        info!(
            org = org_id,
            synced = report.synced.len(),
            failed = report.failed.len(),
            "org synced"
        );
        Ok(report)
    }
}
