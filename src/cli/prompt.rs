//! Interactive org selection.

use std::io::{self, IsTerminal};

use dialoguer::{Confirm, Select};

use crate::core::directory::{OrgChoice, OrgPrompt};
use crate::core::domain::OrgMembership;
use crate::error::Result;

/// Asks on the terminal. Declines when stdin is not a terminal.
pub struct TerminalPrompt;

impl OrgPrompt for TerminalPrompt {
    fn choose(&self, memberships: &[OrgMembership]) -> Result<Option<OrgChoice>> {
        if !io::stdin().is_terminal() {
            return Ok(None);
        }

        let labels: Vec<String> = memberships.iter().map(ToString::to_string).collect();
        let Some(index) = Select::new()
            .with_prompt("Organization")
            .items(&labels)
            .default(0)
            .interact_opt()?
        else {
            return Ok(None);
        };

        let remember = Confirm::new()
            .with_prompt("Use this organization by default?")
            .default(true)
            .interact()?;

        Ok(Some(OrgChoice {
            org_id: memberships[index].org_id.clone(),
            remember,
        }))
    }
}
