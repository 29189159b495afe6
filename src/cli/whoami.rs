//! Whoami command - print this machine's identity.

use std::path::Path;

use crate::cli::output;
use crate::core::store::IdentityStore;
use crate::error::Result;

pub fn execute(root: &Path, public_key: bool) -> Result<()> {
    let store = IdentityStore::open(root)?;

    if public_key {
        output::data(store.public_key()?.trim_end());
        return Ok(());
    }

    let identity = store.identity();
    output::kv("machine_id", &identity.machine_id);
    output::kv("name", identity.name());
    output::kv("server", &identity.server_url);
    output::kv("org", identity.active_org_id.as_deref().unwrap_or("-"));
    output::kv("environment", identity.environment());
    output::kv(
        "session",
        if identity.token().is_some() {
            "logged in"
        } else {
            "logged out"
        },
    );
    Ok(())
}
