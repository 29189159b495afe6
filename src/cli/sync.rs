//! Sync command.

use crate::cli::{context, output, Target};
use crate::core::agent::Agent;
use crate::error::Result;

pub async fn execute(mut agent: Agent, target: &Target, all: bool) -> Result<()> {
    if !all {
        let scope = context::scope(&mut agent, target).await?;
        let report = agent.sync_keys(&scope).await?;
        output::success(&format!(
            "synced {} for {} machines",
            scope,
            report.wrapped_for.len()
        ));
        return Ok(());
    }

    let org = context::org(&mut agent, target.org.clone()).await?;
    let report = agent.sync_all(&org).await?;
    for (scope, outcome) in &report.synced {
        output::list_item(&format!(
            "{}  {} machines",
            output::key(&scope.to_string()),
            outcome.wrapped_for.len()
        ));
    }
    for (scope, reason) in &report.failed {
        output::warn(&format!("{}: {}", scope, reason));
    }
    output::success(&format!(
        "synced {} of {} environments",
        report.synced.len(),
        report.synced.len() + report.failed.len()
    ));
    Ok(())
}
