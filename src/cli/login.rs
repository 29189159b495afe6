//! Login and logout commands.

use crate::cli::output;
use crate::core::agent::Agent;
use crate::error::Result;

pub async fn login(mut agent: Agent) -> Result<()> {
    agent.login().await?;
    output::success(&format!(
        "logged in to {}",
        agent.store().identity().server_url
    ));
    Ok(())
}

pub fn logout(mut agent: Agent) -> Result<()> {
    agent.logout()?;
    output::success("logged out");
    Ok(())
}
