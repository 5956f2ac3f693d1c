//! Directory provisioning.

use std::fs::DirBuilder;
use std::os::unix::fs::DirBuilderExt;
use std::path::Path;

use tracing::info;

use crate::error::{Error, Result};

/// Permissions of directories created by torsrv (owner only).
pub const DIR_MODE: u32 = 0o700;

/// Create `path` (and missing parents) with [`DIR_MODE`] unless it exists.
///
/// Returns `true` when the directory was created. Existing directories keep
/// their permissions.
pub fn ensure_dir(path: &Path) -> Result<bool> {
    if path.is_dir() {
        info!(path = %path.display(), "Directory already exists");
        return Ok(false);
    }

    info!(path = %path.display(), "Creating directory");
    DirBuilder::new()
        .recursive(true)
        .mode(DIR_MODE)
        .create(path)
        .map_err(|e| Error::io(path, e))?;
    Ok(true)
}
