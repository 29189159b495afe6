//! Pull command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::cli::{context, output, Target};
use crate::core::agent::Agent;
use crate::core::env;
use crate::error::Result;

/// How pulled variables are shown.
pub enum Format {
    /// `KEY=value` on stdout.
    Env,
    Json,
    /// Names and timestamps, no values.
    List,
    /// A dotenv file readable only by the owner.
    File(PathBuf),
}

pub async fn execute(
    mut agent: Agent,
    target: &Target,
    key: Option<&str>,
    format: Format,
) -> Result<()> {
    let scope = context::scope(&mut agent, target).await?;

    if let Some(key) = key {
        let value = agent.pull_key(&scope, key).await?;
        return match format {
            Format::Env | Format::List => {
                output::data(&value);
                Ok(())
            }
            Format::Json => {
                let single = BTreeMap::from([(key, value.as_str())]);
                output::data(&serde_json::to_string_pretty(&single)?);
                Ok(())
            }
            Format::File(path) => {
                let single = BTreeMap::from([(key.to_string(), value)]);
                env::write(&path, &single)?;
                output::success(&format!("wrote {} to {}", key, path.display()));
                Ok(())
            }
        };
    }

    let secrets = agent.pull(&scope).await?;

    match format {
        Format::Env => print!("{}", env::render(&secrets.values())),
        Format::Json => {
            let plain: BTreeMap<&str, &str> =
                secrets.iter().map(|(k, s)| (k, s.value())).collect();
            output::data(&serde_json::to_string_pretty(&plain)?);
        }
        Format::List => {
            output::header(&scope.to_string());
            for (name, secret) in secrets.iter() {
                let when = secret
                    .created()
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string());
                output::list_item(&format!("{:<24}{}", output::key(name), when));
            }
        }
        Format::File(path) => {
            env::write(&path, &secrets.values())?;
            output::success(&format!(
                "wrote {} variables to {}",
                secrets.len(),
                path.display()
            ));
        }
    }
    Ok(())
}
