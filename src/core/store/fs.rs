//! Filesystem helpers for the identity store.
//!
//! Every write goes through a temp file and a rename so a crash never leaves
//! a truncated identity behind.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::{trace, warn};
use zeroize::Zeroizing;

use crate::error::{Result, StoreError};

/// Atomically replace `path` with `contents`, creating parent directories.
pub(super) fn write_atomic(path: &Path, contents: &[u8], mode: u32) -> Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| StoreError::InvalidFormat(format!("{} has no parent", path.display())))?;
    fs::create_dir_all(dir).map_err(StoreError::WriteFailed)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = dir.join(format!(".{}.tmp", file_name));

    let mut options = fs::OpenOptions::new();
    options.create(true).truncate(true).write(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(mode);
    }
    #[cfg(not(unix))]
    let _ = mode;

    let mut file = options.open(&tmp_path).map_err(StoreError::WriteFailed)?;
    file.write_all(contents).map_err(StoreError::WriteFailed)?;
    file.sync_all().map_err(StoreError::WriteFailed)?;
    drop(file);

    // A stale temp file may predate the mode argument
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(mode))
            .map_err(StoreError::WriteFailed)?;
    }

    fs::rename(&tmp_path, path).map_err(StoreError::WriteFailed)?;
    trace!(path = %path.display(), "wrote file");
    Ok(())
}

/// Read a file that holds key material.
pub(super) fn read_sensitive(path: &Path) -> Result<Zeroizing<String>> {
    fs::read_to_string(path)
        .map(Zeroizing::new)
        .map_err(|e| StoreError::ReadFailed(e).into())
}

/// Warn when a file is more permissive than `expected_mode` (Unix only).
pub(super) fn warn_if_insecure(path: &Path, expected_mode: u32) {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        if let Ok(metadata) = fs::metadata(path) {
            let actual = metadata.permissions().mode() & 0o777;
            if actual & !expected_mode != 0 {
                warn!(
                    path = %path.display(),
                    mode = %format!("{:o}", actual),
                    expected = %format!("{:o}", expected_mode),
                    "insecure file permissions"
                );
            }
        }
    }
    #[cfg(not(unix))]
    let _ = (path, expected_mode);
}
