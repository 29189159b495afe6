//! Machine listing and enrolment.

use std::path::PathBuf;

use crate::cli::{context, output};
use crate::core::agent::Agent;
use crate::error::{Error, Result};

pub async fn list(mut agent: Agent, org: Option<String>) -> Result<()> {
    let org = context::org(&mut agent, org).await?;
    let machines = agent.list_machines(&org).await?;
    let me = agent.store().machine_id();

    output::header(&format!("{} machines in {}", machines.len(), org));
    for machine in &machines {
        let suffix = if machine.machine_id == me { " (this machine)" } else { "" };
        output::list_item(&format!(
            "{}  {}{}",
            machine.machine_id, machine.name, suffix
        ));
    }
    Ok(())
}

pub async fn enrol(
    mut agent: Agent,
    org: Option<String>,
    machine_id: Option<String>,
    name: Option<String>,
    public_key: Option<PathBuf>,
) -> Result<()> {
    let org = context::org(&mut agent, org).await?;

    let row = match (machine_id, public_key) {
        (Some(machine_id), Some(path)) => {
            let pem = std::fs::read_to_string(&path)?;
            let name = name.unwrap_or_else(|| machine_id.clone());
            agent.enrol_machine(&org, &machine_id, &name, &pem).await?
        }
        (None, None) => agent.enrol(&org).await?,
        _ => {
            return Err(Error::InvalidInput(
                "--machine-id and --public-key go together".into(),
            ))
        }
    };

    output::success(&format!("enrolled {} in {}", row.machine_id, org));
    output::hint("run: nvolt sync --all from an enrolled machine to grant access");
    Ok(())
}
