//! Run configuration assembly.

use tracing::debug;

use crate::config::normalize::normalize;
use crate::config::resolver::{resolve, Settings};
use crate::config::schema::{IdentityConfig, RunConfig};
use crate::config::source::{EnvSource, Origin};
use crate::config::validation::validate;
use crate::error::{Error, Result};
use crate::system::PasswordHasher;

/// Resolve, normalize and validate the configuration of a run.
///
/// Nothing is written to disk; the only side effect is the password hashing
/// collaborator call for a control role with a password.
pub fn load_run_config(
    settings: &Settings,
    env: &dyn EnvSource,
    hasher: &dyn PasswordHasher,
) -> Result<RunConfig> {
    let resolved = resolve(settings, env)?;
    let role = normalize(&resolved.raw, hasher)?;

    let config = RunConfig {
        base_dir: resolved.paths.base_dir,
        cfg_path: resolved.paths.cfg_path,
        use_yaml: resolved.raw.origin == Origin::Yaml,
        overwrite: settings.overwrite,
        identity: IdentityConfig {
            account: settings.account.clone(),
            uid: settings.uid,
            gid: settings.gid,
        },
        role,
    };

    validate(&config).map_err(Error::Invalid)?;
    debug!(role = %config.role(), "Configuration validated");

    Ok(config)
}
