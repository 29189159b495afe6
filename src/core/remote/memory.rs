//! In-memory server used by engine tests.
//!
//! Behaves like the real API where the engine can observe it: challenges are
//! OAEP-encrypted nonces checked with PSS, each challenge answers once, org
//! endpoints need a session and a membership, and a push replaces the whole
//! scope in one step.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use rand::RngCore;

use super::{
    Api, ChallengeResponse, EnrolRequest, PullResponse, PushRequest, StoredVariable,
    VerifyRequest, VerifyResponse,
};
use crate::core::cipher;
use crate::core::domain::{EnrolledMachine, OrgMembership, ProjectEnvironment, Scope};
use crate::core::types::{MachineId, MachineKeyId, OrgId, PublicKeyPem, WrappedKey};
use crate::error::{RemoteError, Result};

type ScopeKey = (OrgId, String, String);

#[derive(Default)]
struct StoredScope {
    variables: BTreeMap<String, StoredVariable>,
    wrapped_keys: BTreeMap<MachineKeyId, WrappedKey>,
}

struct Pending {
    machine_id: MachineId,
    nonce: Vec<u8>,
}

#[derive(Default)]
struct State {
    orgs: BTreeMap<OrgId, String>,
    members: HashMap<OrgId, BTreeSet<MachineId>>,
    machines: HashMap<OrgId, Vec<EnrolledMachine>>,
    public_keys: HashMap<MachineId, PublicKeyPem>,
    scopes: HashMap<ScopeKey, StoredScope>,
    challenges: HashMap<String, Pending>,
    sessions: HashMap<String, MachineId>,
    pushes: Vec<PushRequest>,
    next_id: u64,
}

impl State {
    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}-{}", prefix, self.next_id)
    }

    fn check_member(&self, org_id: &str, machine_id: &str) -> Result<()> {
        if !self.orgs.contains_key(org_id) {
            return Err(status(404, "organization not found"));
        }
        let member = self
            .members
            .get(org_id)
            .is_some_and(|m| m.contains(machine_id));
        if member {
            Ok(())
        } else {
            Err(status(403, "not a member of this organization"))
        }
    }
}

fn status(status: u16, body: &str) -> crate::error::Error {
    RemoteError::Status {
        status,
        body: format!(r#"{{"error":"{}"}}"#, body),
    }
    .into()
}

fn scope_key(scope: &Scope) -> Result<ScopeKey> {
    Ok((
        scope.org_id()?.to_string(),
        scope.project.clone(),
        scope.environment.clone(),
    ))
}

/// Shared server state plus admin operations that bypass the API.
#[derive(Clone, Default)]
pub(crate) struct MemoryServer {
    state: Arc<Mutex<State>>,
}

impl MemoryServer {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap()
    }

    pub fn create_org(&self, org_id: &str, name: &str) {
        self.lock().orgs.insert(org_id.to_string(), name.to_string());
    }

    /// Grant a machine's user access to an org without enrolling its key.
    pub fn add_member(&self, org_id: &str, machine_id: &str) {
        self.lock()
            .members
            .entry(org_id.to_string())
            .or_default()
            .insert(machine_id.to_string());
    }

    /// Make a machine known to the auth endpoints.
    pub fn register(&self, machine_id: &str, public_key: &str) {
        self.lock()
            .public_keys
            .insert(machine_id.to_string(), public_key.to_string());
    }

    /// Enrol a machine directly, as an admin would.
    pub fn enrol(&self, org_id: &str, machine_id: &str, public_key: &str) -> EnrolledMachine {
        let mut state = self.lock();
        enrol_locked(
            &mut state,
            org_id,
            &EnrolRequest {
                machine_id: machine_id.to_string(),
                name: machine_id.to_string(),
                public_key: public_key.to_string(),
            },
        )
    }

    /// Drop a machine's key row from the directory. Its membership stays.
    pub fn remove_machine(&self, org_id: &str, machine_id: &str) {
        if let Some(rows) = self.lock().machines.get_mut(org_id) {
            rows.retain(|m| m.machine_id != machine_id);
        }
    }

    pub fn client(&self, machine_id: &str) -> MemoryClient {
        MemoryClient {
            machine_id: machine_id.to_string(),
            state: Arc::clone(&self.state),
            latency: None,
            token: Mutex::new(None),
        }
    }

    /// Every push body received, oldest first.
    pub fn push_bodies(&self) -> Vec<PushRequest> {
        self.lock().pushes.clone()
    }

    pub fn wrapped_key(&self, scope: &Scope, machine_key_id: &str) -> Option<WrappedKey> {
        let key = scope_key(scope).ok()?;
        self.lock()
            .scopes
            .get(&key)
            .and_then(|s| s.wrapped_keys.get(machine_key_id).cloned())
    }

    pub fn wrapped_key_ids(&self, scope: &Scope) -> BTreeSet<MachineKeyId> {
        let Ok(key) = scope_key(scope) else {
            return BTreeSet::new();
        };
        self.lock()
            .scopes
            .get(&key)
            .map(|s| s.wrapped_keys.keys().cloned().collect())
            .unwrap_or_default()
    }

    pub fn ciphertexts(&self, scope: &Scope) -> BTreeMap<String, String> {
        let Ok(key) = scope_key(scope) else {
            return BTreeMap::new();
        };
        self.lock()
            .scopes
            .get(&key)
            .map(|s| {
                s.variables
                    .iter()
                    .map(|(k, v)| (k.clone(), v.value.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Overwrite one stored ciphertext with well-formed garbage.
    pub fn corrupt_variable(&self, scope: &Scope, name: &str) {
        let key = scope_key(scope).unwrap();
        let mut state = self.lock();
        let stored = state.scopes.get_mut(&key).unwrap();
        let variable = stored.variables.get_mut(name).unwrap();
        variable.value = BASE64.encode([7u8; 48]);
    }
}

fn enrol_locked(state: &mut State, org_id: &str, request: &EnrolRequest) -> EnrolledMachine {
    let row = EnrolledMachine {
        machine_key_id: state.next_id("mk"),
        machine_id: request.machine_id.clone(),
        name: request.name.clone(),
        public_key: request.public_key.clone(),
    };
    state
        .machines
        .entry(org_id.to_string())
        .or_default()
        .push(row.clone());
    state
        .members
        .entry(org_id.to_string())
        .or_default()
        .insert(request.machine_id.clone());
    state
        .public_keys
        .insert(request.machine_id.clone(), request.public_key.clone());
    row
}

/// One machine's view of a [`MemoryServer`].
pub(crate) struct MemoryClient {
    machine_id: MachineId,
    state: Arc<Mutex<State>>,
    latency: Option<Duration>,
    token: Mutex<Option<String>>,
}

impl MemoryClient {
    /// Delay every call by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn session_token(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    async fn enter(&self) -> MutexGuard<'_, State> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        self.state.lock().unwrap()
    }

    /// Enter and check the session.
    async fn session(&self) -> Result<MutexGuard<'_, State>> {
        let token = self.session_token();
        let state = self.enter().await;
        match token.and_then(|t| state.sessions.get(&t).cloned()) {
            Some(owner) if owner == self.machine_id => Ok(state),
            _ => Err(status(401, "missing or invalid session")),
        }
    }
}

#[async_trait]
impl Api for MemoryClient {
    fn set_session_token(&self, token: Option<&str>) {
        *self.token.lock().unwrap() = token.map(str::to_string);
    }

    async fn request_challenge(&self, machine_name: &str) -> Result<ChallengeResponse> {
        let mut state = self.enter().await;
        let public_key = state
            .public_keys
            .get(machine_name)
            .cloned()
            .ok_or_else(|| status(404, "unknown machine"))?;

        let mut nonce = vec![0u8; 32];
        rand::thread_rng().fill_bytes(&mut nonce);
        let challenge = cipher::encrypt_to(&public_key, &nonce)?;
        let challenge_id = state.next_id("ch");
        state.challenges.insert(
            challenge_id.clone(),
            Pending {
                machine_id: machine_name.to_string(),
                nonce,
            },
        );
        Ok(ChallengeResponse {
            challenge,
            challenge_id,
        })
    }

    async fn verify_challenge(&self, request: &VerifyRequest) -> Result<VerifyResponse> {
        let mut state = self.enter().await;
        let pending = match state.challenges.remove(&request.challenge_id) {
            Some(p) if p.machine_id == request.machine_name => p,
            _ => {
                return Ok(VerifyResponse {
                    success: false,
                    token: String::new(),
                    message: Some("invalid or expired challenge".to_string()),
                })
            }
        };
        let public_key = state
            .public_keys
            .get(&pending.machine_id)
            .cloned()
            .ok_or_else(|| status(404, "unknown machine"))?;

        if cipher::verify(&public_key, &pending.nonce, &request.signature).is_err() {
            return Err(status(403, "signature verification failed"));
        }

        let token = state.next_id("jwt");
        state.sessions.insert(token.clone(), pending.machine_id);
        Ok(VerifyResponse {
            success: true,
            token,
            message: None,
        })
    }

    async fn list_orgs(&self) -> Result<Vec<OrgMembership>> {
        let state = self.session().await?;
        Ok(state
            .orgs
            .iter()
            .filter(|(id, _)| {
                state
                    .members
                    .get(*id)
                    .is_some_and(|m| m.contains(&self.machine_id))
            })
            .map(|(id, name)| OrgMembership {
                org_id: id.clone(),
                org_name: name.clone(),
                role: "member".to_string(),
            })
            .collect())
    }

    async fn list_machines(&self, org_id: &str) -> Result<Vec<EnrolledMachine>> {
        let state = self.session().await?;
        state.check_member(org_id, &self.machine_id)?;
        Ok(state.machines.get(org_id).cloned().unwrap_or_default())
    }

    async fn enrol_machine(&self, org_id: &str, request: &EnrolRequest) -> Result<EnrolledMachine> {
        let mut state = self.session().await?;
        state.check_member(org_id, &self.machine_id)?;
        cipher::parse_public_key(&request.public_key).map_err(|_| status(400, "bad public key"))?;
        Ok(enrol_locked(&mut state, org_id, request))
    }

    async fn list_project_environments(&self, org_id: &str) -> Result<Vec<ProjectEnvironment>> {
        let state = self.session().await?;
        state.check_member(org_id, &self.machine_id)?;
        let mut pairs: Vec<ProjectEnvironment> = state
            .scopes
            .keys()
            .filter(|(org, _, _)| org == org_id)
            .map(|(_, project, environment)| ProjectEnvironment {
                project: project.clone(),
                environment: environment.clone(),
            })
            .collect();
        pairs.sort();
        Ok(pairs)
    }

    async fn pull_secrets(
        &self,
        scope: &Scope,
        key: Option<&str>,
        machine_key_id: &MachineKeyId,
    ) -> Result<PullResponse> {
        let state = self.session().await?;
        let addr = scope_key(scope)?;
        state.check_member(&addr.0, &self.machine_id)?;

        let Some(stored) = state.scopes.get(&addr) else {
            return Ok(PullResponse::default());
        };
        let variables = match key {
            Some(name) => {
                let value = stored
                    .variables
                    .get(name)
                    .cloned()
                    .ok_or_else(|| status(404, "variable not found"))?;
                BTreeMap::from([(name.to_string(), value)])
            }
            None => stored.variables.clone(),
        };
        Ok(PullResponse {
            variables,
            wrapped_key: stored
                .wrapped_keys
                .get(machine_key_id)
                .cloned()
                .unwrap_or_default(),
        })
    }

    async fn push_secrets(&self, scope: &Scope, request: &PushRequest) -> Result<()> {
        let mut state = self.session().await?;
        let addr = scope_key(scope)?;
        state.check_member(&addr.0, &self.machine_id)?;

        let now = chrono::Utc::now().to_rfc3339();
        let variables = request.variables.iter().map(|(name, value)| {
            (
                name.clone(),
                StoredVariable {
                    value: value.clone(),
                    created_at: now.clone(),
                },
            )
        });

        let stored = state.scopes.entry(addr).or_default();
        if request.replace_all {
            *stored = StoredScope {
                variables: variables.collect(),
                wrapped_keys: request.wrapped_keys.clone(),
            };
        } else {
            stored.variables.extend(variables);
            stored.wrapped_keys.extend(request.wrapped_keys.clone());
        }
        state.pushes.push(request.clone());
        Ok(())
    }
}
