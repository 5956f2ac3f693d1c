//! Configuration file writing under the overwrite policy.

use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::error::{Error, Result};

/// What happened to the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteOutcome {
    /// The file did not exist and was written.
    Created,
    /// The file existed and overwriting was allowed.
    Overwritten,
    /// The file was left untouched.
    Skipped,
}

/// Write `contents` to `path` unless it exists and `overwrite` is false.
pub fn write_config(path: &Path, contents: &str, overwrite: bool) -> Result<WriteOutcome> {
    let outcome = if path.exists() {
        if !overwrite {
            info!(path = %path.display(), "Configuration file present, will NOT overwrite it");
            return Ok(WriteOutcome::Skipped);
        }
        info!(path = %path.display(), "Configuration file present, overwriting");
        WriteOutcome::Overwritten
    } else {
        info!(path = %path.display(), "Configuration file missing, creating it");
        WriteOutcome::Created
    };

    fs::write(path, contents).map_err(|e| Error::io(path, e))?;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("torrc");

        assert_eq!(write_config(&path, "SocksPort 9050\n", false).unwrap(), WriteOutcome::Created);
        assert_eq!(fs::read_to_string(&path).unwrap(), "SocksPort 9050\n");
    }

    #[test]
    fn test_existing_file_kept_without_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("torrc");
        fs::write(&path, "# hand edited\n").unwrap();

        assert_eq!(write_config(&path, "SocksPort 9050\n", false).unwrap(), WriteOutcome::Skipped);
        assert_eq!(fs::read_to_string(&path).unwrap(), "# hand edited\n");
    }

    #[test]
    fn test_existing_file_replaced_with_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("torrc");
        fs::write(&path, "# old\n").unwrap();

        assert_eq!(write_config(&path, "SocksPort 9050\n", true).unwrap(), WriteOutcome::Overwritten);
        assert_eq!(fs::read_to_string(&path).unwrap(), "SocksPort 9050\n");
    }

    #[test]
    fn test_missing_parent_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("torrc");

        assert!(matches!(write_config(&path, "", false), Err(Error::Io { .. })));
    }
}
