//! Push command.

use std::collections::BTreeMap;
use std::path::Path;

use crate::cli::{context, output, Target};
use crate::core::agent::Agent;
use crate::core::env;
use crate::error::{Error, Result};

pub async fn execute(
    mut agent: Agent,
    target: &Target,
    pairs: &[String],
    file: Option<&Path>,
    replace: bool,
) -> Result<()> {
    let vars = collect(pairs, file)?;
    if vars.is_empty() && !replace {
        return Err(Error::InvalidInput("nothing to push".into()));
    }

    let scope = context::scope(&mut agent, target).await?;
    let report = agent.push(&scope, &vars, replace).await?;

    for skipped in &report.skipped {
        output::warn(&format!(
            "could not wrap key for {}: {}",
            skipped.machine_id, skipped.reason
        ));
    }
    output::success(&format!(
        "pushed {} variables to {} for {} machines",
        report.variables,
        scope,
        report.wrapped_for.len()
    ));
    Ok(())
}

/// Variables from `file` overlaid with `KEY=VALUE` arguments.
fn collect(pairs: &[String], file: Option<&Path>) -> Result<BTreeMap<String, String>> {
    let mut vars = match file {
        Some(path) => env::load(path)?,
        None => BTreeMap::new(),
    };
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .filter(|(k, _)| !k.trim().is_empty())
            .ok_or_else(|| Error::InvalidInput(format!("expected KEY=VALUE, got {}", pair)))?;
        vars.insert(key.trim().to_string(), value.to_string());
    }
    Ok(vars)
}
