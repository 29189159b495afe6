//! Server API.
//!
//! [`Api`] is the full remote surface the engine needs. [`HttpApi`] speaks
//! it over HTTPS; tests drive the engine through an in-memory server.

mod http;
#[cfg(test)]
pub(crate) mod memory;
pub mod wire;

use async_trait::async_trait;
use serde::de::IgnoredAny;

use crate::core::domain::{EnrolledMachine, OrgMembership, ProjectEnvironment, Scope};
use crate::core::types::MachineKeyId;
use crate::error::Result;

pub use http::Transport;
pub use wire::{
    ChallengeRequest, ChallengeResponse, EnrolRequest, PullResponse, PushRequest, StoredVariable,
    VerifyRequest, VerifyResponse,
};

use wire::Listing;

/// Remote operations, one per endpoint.
#[async_trait]
pub trait Api: Send + Sync {
    /// Attach (or drop) the session token on later requests.
    fn set_session_token(&self, token: Option<&str>);

    async fn request_challenge(&self, machine_name: &str) -> Result<ChallengeResponse>;

    async fn verify_challenge(&self, request: &VerifyRequest) -> Result<VerifyResponse>;

    async fn list_orgs(&self) -> Result<Vec<OrgMembership>>;

    async fn list_machines(&self, org_id: &str) -> Result<Vec<EnrolledMachine>>;

    async fn enrol_machine(&self, org_id: &str, request: &EnrolRequest) -> Result<EnrolledMachine>;

    async fn list_project_environments(&self, org_id: &str) -> Result<Vec<ProjectEnvironment>>;

    /// Fetch a scope, or one variable of it, with the wrapped key belonging
    /// to `machine_key_id`.
    async fn pull_secrets(
        &self,
        scope: &Scope,
        key: Option<&str>,
        machine_key_id: &MachineKeyId,
    ) -> Result<PullResponse>;

    async fn push_secrets(&self, scope: &Scope, request: &PushRequest) -> Result<()>;
}

/// [`Api`] over a [`Transport`].
#[derive(Debug)]
pub struct HttpApi {
    transport: Transport,
}

impl HttpApi {
    pub fn new(transport: Transport) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }
}

fn org_path(org_id: &str) -> String {
    format!("/organizations/{}", urlencoding::encode(org_id))
}

fn secrets_path(scope: &Scope, key: Option<&str>) -> Result<String> {
    let mut path = format!(
        "{}/projects/{}/environments/{}/secrets",
        org_path(scope.org_id()?),
        urlencoding::encode(&scope.project),
        urlencoding::encode(&scope.environment),
    );
    if let Some(key) = key {
        path.push('/');
        path.push_str(&urlencoding::encode(key));
    }
    Ok(path)
}

#[async_trait]
impl Api for HttpApi {
    fn set_session_token(&self, token: Option<&str>) {
        self.transport.set_token(token);
    }

    async fn request_challenge(&self, machine_name: &str) -> Result<ChallengeResponse> {
        let body = ChallengeRequest {
            machine_name: machine_name.to_string(),
        };
        self.transport.post("/auth/challenge", &body).await
    }

    async fn verify_challenge(&self, request: &VerifyRequest) -> Result<VerifyResponse> {
        self.transport.post("/auth/verify", request).await
    }

    async fn list_orgs(&self) -> Result<Vec<OrgMembership>> {
        let listing: Listing<OrgMembership> = self.transport.get("/user/orgs", &[]).await?;
        Ok(listing.into_vec())
    }

    async fn list_machines(&self, org_id: &str) -> Result<Vec<EnrolledMachine>> {
        let path = format!("{}/machines", org_path(org_id));
        let listing: Listing<EnrolledMachine> = self.transport.get(&path, &[]).await?;
        Ok(listing.into_vec())
    }

    async fn enrol_machine(&self, org_id: &str, request: &EnrolRequest) -> Result<EnrolledMachine> {
        let path = format!("{}/machines", org_path(org_id));
        self.transport.post(&path, request).await
    }

    async fn list_project_environments(&self, org_id: &str) -> Result<Vec<ProjectEnvironment>> {
        let path = format!("{}/environments", org_path(org_id));
        let listing: Listing<ProjectEnvironment> = self.transport.get(&path, &[]).await?;
        Ok(listing.into_vec())
    }

    async fn pull_secrets(
        &self,
        scope: &Scope,
        key: Option<&str>,
        machine_key_id: &MachineKeyId,
    ) -> Result<PullResponse> {
        let path = secrets_path(scope, key)?;
        let response: Option<PullResponse> = self
            .transport
            .get(&path, &[("machine_key_id", machine_key_id.as_str())])
            .await?;
        Ok(response.unwrap_or_default())
    }

    async fn push_secrets(&self, scope: &Scope, request: &PushRequest) -> Result<()> {
        let path = secrets_path(scope, None)?;
        let _: IgnoredAny = self.transport.post(&path, request).await?;
        Ok(())
    }
}
