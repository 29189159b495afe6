//! Configuration resolution.
//!
//! Decides where the identity lives and which server a new identity talks
//! to. Both can be overridden through environment variables.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::core::constants;
use crate::error::{Result, StoreError};

/// Directory holding `private_key.pem` and `config.json`.
///
/// `$NVOLT_CONFIG` if set (a leading `~/` expands to the home directory),
/// otherwise `~/.nvolt`.
pub fn config_root() -> Result<PathBuf> {
    let override_path = std::env::var(constants::CONFIG_ENV).ok();
    let root = resolve_root(override_path.as_deref(), dirs::home_dir().as_deref())?;
    debug!(path = %root.display(), "resolved config root");
    Ok(root)
}

/// Pure form of [`config_root`].
pub fn resolve_root(override_path: Option<&str>, home: Option<&Path>) -> Result<PathBuf> {
    match override_path.map(str::trim).filter(|p| !p.is_empty()) {
        Some(path) => expand_home(path, home),
        None => home
            .map(|h| h.join(constants::CONFIG_DIR))
            .ok_or_else(|| StoreError::NoHomeDir.into()),
    }
}

/// Expand `~` and `~/...` against `home`.
pub fn expand_home(path: &str, home: Option<&Path>) -> Result<PathBuf> {
    if path == "~" {
        return home.map(Path::to_path_buf).ok_or_else(|| StoreError::NoHomeDir.into());
    }
    match path.strip_prefix("~/") {
        Some(rest) => home
            .map(|h| h.join(rest))
            .ok_or_else(|| StoreError::NoHomeDir.into()),
        None => Ok(PathBuf::from(path)),
    }
}

/// Server URL written into a new identity.
pub fn default_server_url() -> String {
    std::env::var(constants::SERVER_URL_ENV)
        .ok()
        .map(|url| url.trim().trim_end_matches('/').to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| constants::DEFAULT_SERVER_URL.to_string())
}
