//! Source precedence, role and path resolution.
//!
//! # Responsibilities
//! - Decide between the YAML document and environment variables
//! - Determine the single active role
//! - Resolve the base directory, configuration path and YAML path
//!
//! # Design Decisions
//! - A YAML source always wins; a role argument is then ignored (logged)
//! - Each path resolves independently: explicit override, then
//!   `<base>/<default file name>`, then the built-in default base
//! - Empty overrides behave as unset

use std::path::{Path, PathBuf};

use tracing::info;

use crate::config::schema::{Role, DEFAULT_ACCOUNT, DEFAULT_BASE_DIR, TORRC_FILE_NAME, YAML_FILE_NAME};
use crate::config::source::{self, EnvSource, RawConfig};
use crate::error::{Error, Result};

/// How `YAML_CFG` selects the YAML document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum YamlSource {
    /// Configure from environment variables.
    #[default]
    Disabled,
    /// Read `<base>/torsrv.yml`.
    DefaultPath,
    /// Read the given document.
    Path(PathBuf),
}

impl YamlSource {
    /// Interpret the value of `YAML_CFG`.
    ///
    /// Empty or `0|false|no|off` disables YAML, `1|true|yes|on` selects the
    /// default document, anything else is taken as the document path.
    pub fn from_flag(value: Option<&str>) -> Self {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return YamlSource::Disabled;
        };
        match value.to_ascii_lowercase().as_str() {
            "0" | "false" | "no" | "off" => YamlSource::Disabled,
            "1" | "true" | "yes" | "on" => YamlSource::DefaultPath,
            _ => YamlSource::Path(PathBuf::from(value)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, YamlSource::Disabled)
    }
}

/// Launcher inputs, as given by flags or the fixed environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// `ROLE`.
    pub role: Option<String>,
    /// `YAML_CFG`.
    pub yaml: YamlSource,
    /// `BASE_DIR`.
    pub base_dir: Option<PathBuf>,
    /// `CFG_PATH`.
    pub cfg_path: Option<PathBuf>,
    /// `CFG_OVERWRITE` (presence only).
    pub overwrite: bool,
    /// `PUID`.
    pub uid: Option<u32>,
    /// `PGID`.
    pub gid: Option<u32>,
    /// Service account to remap and chown to.
    pub account: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            role: None,
            yaml: YamlSource::Disabled,
            base_dir: None,
            cfg_path: None,
            overwrite: false,
            uid: None,
            gid: None,
            account: DEFAULT_ACCOUNT.to_string(),
        }
    }
}

/// Parse a `PUID`/`PGID` style value; empty or absent means unset.
pub fn parse_id(field: &'static str, value: Option<&str>) -> Result<Option<u32>> {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok(None);
    };
    value.parse().map(Some).map_err(|_| Error::InvalidSetting {
        field,
        value: value.to_string(),
        reason: "expected a numeric id",
    })
}

/// Resolved file system locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    pub base_dir: PathBuf,
    pub cfg_path: PathBuf,
    pub yaml_path: PathBuf,
}

/// Compute the paths of a run from its settings.
pub fn resolve_paths(settings: &Settings) -> ResolvedPaths {
    let base_dir = non_empty(settings.base_dir.as_deref())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_BASE_DIR));

    let cfg_path = non_empty(settings.cfg_path.as_deref())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| base_dir.join(TORRC_FILE_NAME));

    let yaml_path = match &settings.yaml {
        YamlSource::Path(path) => path.clone(),
        YamlSource::Disabled | YamlSource::DefaultPath => base_dir.join(YAML_FILE_NAME),
    };

    ResolvedPaths {
        base_dir,
        cfg_path,
        yaml_path,
    }
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

/// Outcome of resolution: where things live and what to normalize.
#[derive(Debug, Clone)]
pub struct Resolved {
    pub paths: ResolvedPaths,
    pub raw: RawConfig,
}

impl Resolved {
    pub fn role(&self) -> Role {
        self.raw.role
    }
}

/// Apply source precedence and load the raw configuration of the active role.
pub fn resolve(settings: &Settings, env: &dyn EnvSource) -> Result<Resolved> {
    let paths = resolve_paths(settings);
    if settings.base_dir.is_some() {
        info!(base_dir = %paths.base_dir.display(), "Using base directory override");
    }

    let raw = if settings.yaml.is_enabled() {
        if let Some(role) = settings.role.as_deref().filter(|r| !r.trim().is_empty()) {
            info!(ignored_role = role, "YAML configuration requested, ignoring ROLE and role variables");
        }
        info!(path = %paths.yaml_path.display(), "Loading YAML configuration");
        source::load_yaml(&paths.yaml_path)?
    } else {
        let role: Role = settings.role.as_deref().unwrap_or_default().parse()?;
        source::load_env(role, env)?
    };

    info!(role = %raw.role, source = %raw.source_name, "Resolved active role");
    Ok(Resolved { paths, raw })
}
