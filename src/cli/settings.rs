//! Config command.

use std::path::Path;

use crate::cli::{output, ConfigAction};
use crate::core::store::IdentityStore;
use crate::error::Result;

pub fn execute(root: &Path, action: Option<ConfigAction>) -> Result<()> {
    let mut store = IdentityStore::open(root)?;

    match action {
        None => {
            let identity = store.identity();
            output::kv("path", store.root().display());
            output::kv("server", &identity.server_url);
            output::kv("environment", identity.environment());
            output::kv("org", identity.active_org_id.as_deref().unwrap_or("-"));
        }
        Some(ConfigAction::Server { url }) => {
            let had_session = store.identity().token().is_some();
            store.save_server_url(&url)?;
            output::success(&format!("server: {}", store.identity().server_url));
            if had_session && store.identity().token().is_none() {
                output::hint("run: nvolt login");
            }
        }
        Some(ConfigAction::Env { name }) => {
            store.save_default_environment(&name)?;
            output::success(&format!("default environment: {}", name));
        }
    }
    Ok(())
}
