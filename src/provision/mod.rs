//! Provisioning subsystem.
//!
//! # Data Flow
//! ```text
//! RunConfig
//!     → dirs.rs (base dir, service dirs, mode 0700)
//!     → writer.rs (rendered text, overwrite policy)
//!     → AccountManager (uid/gid remap, recursive chown of base dir)
//! ```
//!
//! # Design Decisions
//! - Existing directories are never re-created or re-permissioned
//! - An existing configuration file is replaced only with CFG_OVERWRITE;
//!   otherwise the run continues (non-fatal)
//! - The relay role has no directives, so its file is never written
//! - Identity repair runs last, after everything below the base dir exists

pub mod dirs;
pub mod writer;

use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use crate::config::schema::{RoleConfig, RunConfig};
use crate::error::Result;
use crate::system::AccountManager;

pub use dirs::ensure_dir;
pub use writer::{write_config, WriteOutcome};

/// What provisioning did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionReport {
    /// Directories created by this run, in creation order.
    pub created_dirs: Vec<PathBuf>,
    pub write: WriteOutcome,
}

/// Create directories, write the rendered file and repair ownership.
///
/// The relay role never writes its file, not even an empty one when none exists.
pub fn apply(
    config: &RunConfig,
    rendered: &str,
    accounts: &dyn AccountManager,
) -> Result<ProvisionReport> {
    let mut created_dirs = Vec::new();

    if ensure_dir(&config.base_dir)? {
        created_dirs.push(config.base_dir.clone());
    }
    if let RoleConfig::Service(model) = &config.role {
        for service in &model.services {
            if ensure_dir(&service.dir)? {
                created_dirs.push(service.dir.clone());
            }
        }
    }

    let write = match &config.role {
        RoleConfig::Relay => {
            info!("relay role renders no directives, configuration file left untouched");
            WriteOutcome::Skipped
        }
        _ => write_config(&config.cfg_path, rendered, config.overwrite)?,
    };

    repair_identity(config, accounts)?;

    Ok(ProvisionReport {
        created_dirs,
        write,
    })
}

fn repair_identity(config: &RunConfig, accounts: &dyn AccountManager) -> Result<()> {
    let identity = &config.identity;

    match identity.uid {
        Some(uid) => accounts.set_uid(&identity.account, uid)?,
        None => info!(account = %identity.account, "Using default uid"),
    }
    match identity.gid {
        Some(gid) => accounts.set_gid(&identity.account, gid)?,
        None => info!(account = %identity.account, "Using default gid"),
    }

    accounts.chown_recursive(&identity.account, &config.base_dir)
}
