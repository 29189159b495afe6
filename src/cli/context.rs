//! Shared setup for commands that talk to the server.

use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::cli::prompt::TerminalPrompt;
use crate::cli::Target;
use crate::core::agent::Agent;
use crate::core::domain::Scope;
use crate::core::store::IdentityStore;
use crate::error::{Error, Result};

/// Open the identity under `root` and connect to its server.
pub fn open(root: &Path, cancel: CancellationToken) -> Result<Agent> {
    let store = IdentityStore::open(root)?;
    Ok(Agent::connect(store)?.with_cancellation(cancel))
}

/// Org from the flag, or from org resolution.
pub async fn org(agent: &mut Agent, flag: Option<String>) -> Result<String> {
    if let Some(org) = flag.filter(|o| !o.is_empty()) {
        return Ok(org);
    }
    let state = agent.resolve_org(&TerminalPrompt).await?;
    state.require().map(str::to_string)
}

/// Scope addressed by `target`.
pub async fn scope(agent: &mut Agent, target: &Target) -> Result<Scope> {
    let project = match &target.project {
        Some(p) => p.clone(),
        None => current_project()?,
    };
    let org = org(agent, target.org.clone()).await?;
    Ok(agent.scope(&project, target.env.as_deref()).with_org(org))
}

/// Name of the current directory.
fn current_project() -> Result<String> {
    let dir = std::env::current_dir()?;
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| Error::InvalidInput("cannot infer project name, pass --project".into()))
}
