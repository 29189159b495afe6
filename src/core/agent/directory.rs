//! Directory lookups, enrolment and org selection.
//!
//! Nothing here is cached: key distribution must see machines enrolled a
//! moment ago.

use tracing::{debug, info};

use super::Agent;
use crate::core::cipher;
use crate::core::directory::{self, OrgPrompt, OrgResolution, Persist};
use crate::core::domain::{EnrolledMachine, OrgMembership, ProjectEnvironment};
use crate::core::remote::{Api, EnrolRequest};
use crate::error::Result;

impl<A: Api> Agent<A> {
    pub async fn list_orgs(&self) -> Result<Vec<OrgMembership>> {
        self.remote(self.api.list_orgs()).await
    }

    pub async fn list_machines(&self, org_id: &str) -> Result<Vec<EnrolledMachine>> {
        self.remote(self.api.list_machines(org_id)).await
    }

    pub async fn list_project_environments(&self, org_id: &str) -> Result<Vec<ProjectEnvironment>> {
        self.remote(self.api.list_project_environments(org_id)).await
    }

    /// Enrol this machine's public key in `org_id`.
    ///
    /// Returns the existing row when the machine is already enrolled. Other
    /// machines can read scopes only after someone runs a sync.
    pub async fn enrol(&self, org_id: &str) -> Result<EnrolledMachine> {
        let machine_id = self.store.machine_id();
        let machines = self.list_machines(org_id).await?;
        if let Some(existing) = machines.into_iter().find(|m| m.machine_id == machine_id) {
            debug!(org = org_id, machine_key_id = %existing.machine_key_id, "already enrolled");
            return Ok(existing);
        }

        let name = self.store.identity().name().to_string();
        let public_key = self.store.public_key()?;
        self.enrol_machine(org_id, machine_id, &name, &public_key).await
    }

    /// Enrol any machine's public key in `org_id`.
    ///
    /// # Errors
    ///
    /// Returns `CipherError::InvalidKey` if `public_key` is not an RSA public
    /// key PEM.
    pub async fn enrol_machine(
        &self,
        org_id: &str,
        machine_id: &str,
        name: &str,
        public_key: &str,
    ) -> Result<EnrolledMachine> {
        cipher::parse_public_key(public_key)?;
        let request = EnrolRequest {
            machine_id: machine_id.to_string(),
            name: name.to_string(),
            public_key: public_key.to_string(),
        };
        let row = self.remote(self.api.enrol_machine(org_id, &request)).await?;
        info!(
            org = org_id,
            machine_id,
            machine_key_id = %row.machine_key_id,
            "machine enrolled"
        );
        Ok(row)
    }

    /// Decide which org to use and record the outcome in the identity.
    pub async fn resolve_org(&mut self, prompt: &dyn OrgPrompt) -> Result<OrgResolution> {
        let memberships = self.list_orgs().await?;
        let active = self.store.identity().active_org_id.clone();
        let resolved = directory::resolve(active.as_deref(), &memberships, prompt)?;

        match &resolved.persist {
            Persist::Keep => {}
            Persist::Save(org_id) => self.store.save_active_org(Some(org_id))?,
            Persist::Clear => self.store.save_active_org(None)?,
        }
        debug!(state = ?resolved.state, "org resolved");
        Ok(resolved.state)
    }
}
