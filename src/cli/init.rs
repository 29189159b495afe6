//! Init command - create the machine identity.

use std::path::Path;

use tracing::info;

use crate::cli::output;
use crate::core::config;
use crate::core::store::IdentityStore;
use crate::error::Result;

pub fn execute(root: &Path, server: Option<String>) -> Result<()> {
    if IdentityStore::exists(root) {
        let store = IdentityStore::open(root)?;
        output::warn(&format!("already initialized as {}", store.machine_id()));
        return Ok(());
    }

    let server = server
        .map(|s| s.trim().trim_end_matches('/').to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(config::default_server_url);
    let store = IdentityStore::load_or_init(root, &server)?;
    info!(machine_id = %store.machine_id(), "initialized");

    output::success(&format!("initialized {}", store.root().display()));
    output::kv("machine_id", store.machine_id());
    output::kv("server", &store.identity().server_url);
    output::hint("run: nvolt login");
    Ok(())
}
