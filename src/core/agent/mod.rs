//! The primary interface for nvolt operations.
//!
//! An [`Agent`] bundles the local identity with a server API and runs every
//! remote operation under one cancellation token and one deadline.

mod directory;
mod login;
mod secrets;
mod sync;


use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::core::constants;
use crate::core::domain::{EnrolledMachine, Scope};
use crate::core::remote::{Api, HttpApi, Transport};
use crate::core::store::IdentityStore;
use crate::error::{Error, Result, ScopeError};

/// Identity plus server, the context every operation runs in.
pub struct Agent<A: Api = HttpApi> {
    pub(super) store: IdentityStore,
    pub(super) api: A,
    pub(super) cancel: CancellationToken,
    pub(super) timeout: Duration,
}

impl<A: Api> std::fmt::Debug for Agent<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("identity", self.store.identity())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl Agent<HttpApi> {
    /// Talk to the server recorded in the identity.
    pub fn connect(store: IdentityStore) -> Result<Self> {
        let identity = store.identity();
        let transport = Transport::new(
            &identity.server_url,
            &identity.machine_id,
            identity.token(),
        )?;
        Ok(Self::new(store, HttpApi::new(transport)))
    }
}

impl<A: Api> Agent<A> {
    pub fn new(store: IdentityStore, api: A) -> Self {
        api.set_session_token(store.identity().token());
        Self {
            store,
            api,
            cancel: CancellationToken::new(),
            timeout: constants::DEFAULT_TIMEOUT,
        }
    }

    /// Deadline applied to each remote call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Share a cancellation token with the caller.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn store(&self) -> &IdentityStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut IdentityStore {
        &mut self.store
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Scope in the active org. The environment falls back to the identity's
    /// default.
    pub fn scope(&self, project: &str, environment: Option<&str>) -> Scope {
        let identity = self.store.identity();
        Scope::new(
            identity.active_org_id.clone(),
            project,
            environment.unwrap_or_else(|| identity.environment()),
        )
    }

    /// Run one remote call against the cancellation token and the deadline.
    pub(super) async fn remote<T, F>(&self, call: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        self.checkpoint()?;
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Error::Cancelled),
            outcome = tokio::time::timeout(self.timeout, call) => {
                outcome.map_err(|_| Error::Timeout(self.timeout))?
            }
        }
    }

    pub(super) fn checkpoint(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Fresh machine list for the scope's org, and this machine's row in it.
    pub(super) async fn preamble(
        &self,
        scope: &Scope,
    ) -> Result<(Vec<EnrolledMachine>, EnrolledMachine)> {
        let org_id = scope.org_id()?;
        let machines = self.remote(self.api.list_machines(org_id)).await?;
        let machine_id = self.store.machine_id();

        let me = machines
            .iter()
            .find(|m| m.machine_id == machine_id)
            .cloned()
            .ok_or_else(|| ScopeError::NotEnrolled {
                machine_id: machine_id.to_string(),
                org_id: org_id.to_string(),
            })?;

        debug!(
            org = org_id,
            machines = machines.len(),
            machine_key_id = %me.machine_key_id,
            "directory loaded"
        );
        Ok((machines, me))
    }
}
