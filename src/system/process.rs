//! Collaborators backed by system programs.

use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Output};

use tracing::{debug, info};

use super::{AccountManager, PasswordHasher};
use crate::error::{Error, Result};

/// Hashes passwords with `tor --hash-password`.
#[derive(Debug, Clone)]
pub struct TorPasswordHasher {
    program: String,
}

impl TorPasswordHasher {
    pub fn new() -> Self {
        Self::with_program("tor")
    }

    /// Use a different tor binary (absolute path or name on `PATH`).
    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for TorPasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl PasswordHasher for TorPasswordHasher {
    fn hash(&self, plaintext: &str) -> Result<String> {
        let output = run(&self.program, ["--hash-password", plaintext])?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        // tor may print notices first; the hash is the last line.
        stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .last()
            .map(str::to_string)
            .ok_or_else(|| Error::Collaborator {
                program: self.program.clone(),
                reason: "no hash on stdout".to_string(),
            })
    }
}

/// Manages the service account with `usermod`, `groupmod` and `chown`.
#[derive(Debug, Clone, Default)]
pub struct SystemAccounts;

impl AccountManager for SystemAccounts {
    fn set_uid(&self, account: &str, uid: u32) -> Result<()> {
        info!(account, uid, "Updating service account uid");
        let uid = uid.to_string();
        run("usermod", ["-o", "-u", uid.as_str(), account]).map(drop)
    }

    fn set_gid(&self, account: &str, gid: u32) -> Result<()> {
        info!(account, gid, "Updating service account gid");
        let gid = gid.to_string();
        run("groupmod", ["-o", "-g", gid.as_str(), account]).map(drop)
    }

    fn chown_recursive(&self, account: &str, path: &Path) -> Result<()> {
        info!(account, path = %path.display(), "Updating ownership");
        let owner = format!("{0}:{0}", account);
        run("chown", [OsStr::new("-R"), OsStr::new(&owner), path.as_os_str()]).map(drop)
    }
}

/// Run `program` to completion, failing on spawn errors and non-zero exit.
fn run<I, S>(program: &str, args: I) -> Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    debug!(program, "Invoking collaborator");
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| Error::Collaborator {
            program: program.to_string(),
            reason: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::Collaborator {
            program: program.to_string(),
            reason: format!("{}: {}", output.status, stderr.trim()),
        });
    }

    Ok(output)
}
