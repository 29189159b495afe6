//! Organization commands.

use crate::cli::{context, output};
use crate::core::agent::Agent;
use crate::error::{Result, ScopeError};

/// List memberships, marking the active one.
pub async fn list(agent: Agent) -> Result<()> {
    let orgs = agent.list_orgs().await?;
    if orgs.is_empty() {
        output::dimmed("no organizations");
        return Ok(());
    }

    let active = agent.store().identity().active_org_id.as_deref();
    for org in &orgs {
        let marker = if Some(org.org_id.as_str()) == active {
            "*"
        } else {
            " "
        };
        output::data(&format!("{} {}  {}", marker, org, org.role));
    }
    Ok(())
}

pub async fn select(mut agent: Agent, org_id: &str) -> Result<()> {
    let orgs = agent.list_orgs().await?;
    if !orgs.iter().any(|o| o.org_id == org_id) {
        return Err(ScopeError::NotFound(format!("organization {}", org_id)).into());
    }
    agent.store_mut().save_active_org(Some(org_id))?;
    output::success(&format!("active organization: {}", org_id));
    Ok(())
}

pub fn clear(mut agent: Agent) -> Result<()> {
    agent.store_mut().save_active_org(None)?;
    output::success("active organization cleared");
    Ok(())
}

/// List `(project, environment)` pairs with stored secrets.
pub async fn environments(mut agent: Agent, org: Option<String>) -> Result<()> {
    let org = context::org(&mut agent, org).await?;
    let pairs = agent.list_project_environments(&org).await?;
    if pairs.is_empty() {
        output::dimmed("no environments");
    }
    for pair in pairs {
        output::data(&format!("{}/{}", pair.project, pair.environment));
    }
    Ok(())
}
