//! Startup orchestration.
//!
//! # Responsibilities
//! - Load and validate configuration
//! - Render the configuration file
//! - Provision directories, write the file, repair ownership
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Steps run in order, never concurrently
//! - The merged configuration and rendered lines are logged for operators

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{load_run_config, EnvSource, RunConfig, Settings};
use crate::error::Result;
use crate::provision::{self, ProvisionReport};
use crate::render;
use crate::system::{AccountManager, PasswordHasher};

/// Everything a completed run produced.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub config: RunConfig,
    pub lines: Vec<String>,
    pub provision: ProvisionReport,
}

/// Execute one configuration run.
pub fn run(
    settings: &Settings,
    env: &dyn EnvSource,
    hasher: &dyn PasswordHasher,
    accounts: &dyn AccountManager,
) -> Result<RunReport> {
    let config = load_run_config(settings, env, hasher)?;

    match serde_json::to_string_pretty(&config) {
        Ok(json) => info!("Resolved configuration:\n{}", json),
        Err(e) => debug!(error = %e, "Could not serialize configuration for logging"),
    }

    let lines = render::render(&config);
    info!(
        role = %config.role(),
        lines = lines.len(),
        "Rendered configuration:\n{}",
        lines.join("\n")
    );

    let text = render::to_text(&lines);
    let provision = provision::apply(&config, &text, accounts)?;

    info!(
        path = %config.cfg_path.display(),
        outcome = ?provision.write,
        created_dirs = provision.created_dirs.len(),
        "Provisioning complete"
    );

    Ok(RunReport {
        config,
        lines,
        provision,
    })
}
