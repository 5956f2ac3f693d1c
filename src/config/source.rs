//! Raw configuration sources.
//!
//! # Responsibilities
//! - Read the role-relevant environment variables
//! - Read and structurally check the YAML document
//! - Produce an untyped [`RawConfig`] tree for the normalizer
//!
//! # Design Decisions
//! - Both sources produce the same tree shape (YAML key names), so the
//!   normalizer has a single code path per role
//! - Presence is checked explicitly; an empty variable counts as unset
//! - Only the variables of the active role are read

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};

use crate::config::schema::Role;
use crate::error::{Error, Result};

/// Top-level key of the YAML document.
pub const YAML_ROOT_KEY: &str = "torsrv";

/// Source name used in error messages for env-sourced configuration.
pub const ENV_SOURCE_NAME: &str = "environment";

/// A configuration field known under a YAML key and an environment variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub yaml: &'static str,
    pub env: &'static str,
}

pub const ONIONSERVICE_NAME: Field = Field { yaml: "Name", env: "ONIONSERVICE_NAME" };
pub const ONIONSERVICE_DIR: Field = Field { yaml: "Dir", env: "ONIONSERVICE_DIR" };
pub const ONIONSERVICE_PORT: Field = Field { yaml: "Vport", env: "ONIONSERVICE_PORT" };
pub const ONIONSERVICE_HOST: Field = Field { yaml: "Host", env: "ONIONSERVICE_HOST" };
pub const ONIONSERVICE_VPORTS: Field = Field { yaml: "Vports", env: "ONIONSERVICE_PORT" };

pub const PROXY_PORT: Field = Field { yaml: "Port", env: "PROXY_PORT" };
pub const PROXY_ADDRESS: Field = Field { yaml: "Address", env: "PROXY_ADDRESS" };
pub const PROXY_ACCEPT: Field = Field { yaml: "Accept", env: "PROXY_ACCEPT" };
pub const PROXY_REJECT: Field = Field { yaml: "Reject", env: "PROXY_REJECT" };

pub const CONTROL_PORT: Field = Field { yaml: "Port", env: "CONTROL_PORT" };
pub const CONTROL_PASSWORD: Field = Field { yaml: "Password", env: "CONTROL_PASSWORD" };
pub const CONTROL_COOKIE: Field = Field { yaml: "Cookie", env: "CONTROL_COOKIE" };

/// Read access to environment variables.
pub trait EnvSource {
    /// Value of `key`, or `None` when unset.
    fn var(&self, key: &str) -> Option<String>;

    /// Value of `key`, treating an empty string as unset.
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|v| !v.is_empty())
    }
}

/// The environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

/// Where a [`RawConfig`] was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Env,
    Yaml,
}

/// Untyped configuration for one role.
#[derive(Debug, Clone)]
pub struct RawConfig {
    pub origin: Origin,
    /// Role named by `ROLE` or by the YAML section key.
    pub role: Role,
    /// File path or [`ENV_SOURCE_NAME`], for error messages.
    pub source_name: String,
    /// The role section; `Null` when the section is empty.
    pub section: Value,
}

impl RawConfig {
    /// Name of `field` as the operator wrote it: the env var, or the YAML key
    /// path below the role section.
    pub fn label(&self, path: &[&str], field: Field) -> String {
        match self.origin {
            Origin::Env => field.env.to_string(),
            Origin::Yaml => format!("{}.{}", self.section_label(path), field.yaml),
        }
    }

    /// Dotted path of a (nested) section, e.g. `torsrv.service.web`.
    pub fn section_label(&self, path: &[&str]) -> String {
        let mut label = match self.origin {
            Origin::Env => self.role.to_string(),
            Origin::Yaml => format!("{}.{}", YAML_ROOT_KEY, self.role),
        };
        for segment in path {
            label.push('.');
            label.push_str(segment);
        }
        label
    }
}

/// Read the variables relevant to `role` from `env`.
///
/// Required variables that are unset yield [`Error::MissingRequiredField`];
/// optional ones are simply left out of the tree.
pub fn load_env(role: Role, env: &dyn EnvSource) -> Result<RawConfig> {
    let section = match role {
        Role::Service => {
            let name = require(env, role, ONIONSERVICE_NAME)?;
            let mut service = Mapping::new();
            service.insert(ONIONSERVICE_DIR.yaml.into(), require(env, role, ONIONSERVICE_DIR)?.into());
            service.insert(ONIONSERVICE_PORT.yaml.into(), require(env, role, ONIONSERVICE_PORT)?.into());
            service.insert(ONIONSERVICE_HOST.yaml.into(), require(env, role, ONIONSERVICE_HOST)?.into());

            let mut services = Mapping::new();
            services.insert(name.into(), Value::Mapping(service));
            Value::Mapping(services)
        }
        Role::Proxy => {
            let mut proxy = Mapping::new();
            proxy.insert(PROXY_PORT.yaml.into(), require(env, role, PROXY_PORT)?.into());
            insert_optional(&mut proxy, env, PROXY_ADDRESS);
            proxy.insert(PROXY_ACCEPT.yaml.into(), require(env, role, PROXY_ACCEPT)?.into());
            insert_optional(&mut proxy, env, PROXY_REJECT);
            Value::Mapping(proxy)
        }
        Role::Control => {
            let mut control = Mapping::new();
            control.insert(CONTROL_PORT.yaml.into(), require(env, role, CONTROL_PORT)?.into());
            insert_optional(&mut control, env, CONTROL_PASSWORD);
            insert_optional(&mut control, env, CONTROL_COOKIE);
            Value::Mapping(control)
        }
        Role::Relay => Value::Null,
    };

    Ok(RawConfig {
        origin: Origin::Env,
        role,
        source_name: ENV_SOURCE_NAME.to_string(),
        section,
    })
}

fn require(env: &dyn EnvSource, role: Role, field: Field) -> Result<String> {
    env.non_empty(field.env).ok_or_else(|| Error::MissingRequiredField {
        role: role.as_str(),
        field: field.env.to_string(),
    })
}

fn insert_optional(map: &mut Mapping, env: &dyn EnvSource, field: Field) {
    if let Some(value) = env.non_empty(field.env) {
        map.insert(field.yaml.into(), value.into());
    }
}

/// Read and parse the YAML document at `path`.
pub fn load_yaml(path: &Path) -> Result<RawConfig> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    parse_yaml(&content, &path.display().to_string())
}

/// Parse a YAML document, checking the `torsrv` envelope.
///
/// The `torsrv` mapping must hold exactly one role section.
pub fn parse_yaml(content: &str, source_name: &str) -> Result<RawConfig> {
    let malformed = |reason: String| Error::MalformedConfig {
        source_name: source_name.to_string(),
        reason,
    };

    let document: Value = serde_yaml::from_str(content).map_err(|e| malformed(e.to_string()))?;
    let root = document
        .as_mapping()
        .ok_or_else(|| malformed("document root is not a mapping".to_string()))?;
    let torsrv = root
        .get(YAML_ROOT_KEY)
        .ok_or_else(|| malformed(format!("missing top-level `{}` section", YAML_ROOT_KEY)))?;
    let sections = torsrv
        .as_mapping()
        .ok_or_else(|| malformed(format!("`{}` is not a mapping", YAML_ROOT_KEY)))?;

    let mut entries = sections.iter();
    let (key, section) = match (entries.next(), entries.next()) {
        (Some(entry), None) => entry,
        (None, _) => return Err(malformed(format!("`{}` has no role section", YAML_ROOT_KEY))),
        (Some(_), Some(_)) => {
            return Err(malformed(format!(
                "`{}` must contain exactly one role section, found {}",
                YAML_ROOT_KEY,
                sections.len()
            )))
        }
    };
    let key = key
        .as_str()
        .ok_or_else(|| malformed("role section key is not a string".to_string()))?;
    let role: Role = key.parse()?;

    Ok(RawConfig {
        origin: Origin::Yaml,
        role,
        source_name: source_name.to_string(),
        section: section.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_env_proxy_optional_fields_left_out() {
        let env = env(&[("PROXY_PORT", "9050"), ("PROXY_ACCEPT", "10.0.0.0/8")]);
        let raw = load_env(Role::Proxy, &env).unwrap();
        let map = raw.section.as_mapping().unwrap();
        assert_eq!(map.get("Port").and_then(Value::as_str), Some("9050"));
        assert!(map.get("Address").is_none());
        assert!(map.get("Reject").is_none());
        assert_eq!(raw.origin, Origin::Env);
    }

    #[test]
    fn test_env_missing_required_names_variable() {
        let env = env(&[("PROXY_PORT", "9050")]);
        let err = load_env(Role::Proxy, &env).unwrap_err();
        assert!(matches!(
            err,
            Error::MissingRequiredField { role: "proxy", ref field } if field == "PROXY_ACCEPT"
        ));
    }

    #[test]
    fn test_env_empty_counts_as_unset() {
        let env = env(&[
            ("ONIONSERVICE_NAME", "web"),
            ("ONIONSERVICE_DIR", ""),
            ("ONIONSERVICE_PORT", "80"),
            ("ONIONSERVICE_HOST", "web:80"),
        ]);
        let err = load_env(Role::Service, &env).unwrap_err();
        assert!(matches!(err, Error::MissingRequiredField { ref field, .. } if field == "ONIONSERVICE_DIR"));
    }

    #[test]
    fn test_env_relay_reads_nothing() {
        let raw = load_env(Role::Relay, &HashMap::<String, String>::new()).unwrap();
        assert!(raw.section.is_null());
    }

    #[test]
    fn test_yaml_role_from_section_key() {
        let raw = parse_yaml("torsrv:\n  control:\n    Port: 9051\n", "test.yml").unwrap();
        assert_eq!(raw.role, Role::Control);
        assert_eq!(raw.origin, Origin::Yaml);
        assert_eq!(raw.label(&[], CONTROL_PORT), "torsrv.control.Port");
    }

    #[test]
    fn test_yaml_envelope_errors() {
        let cases = [
            "torsrv: [unclosed",
            "- just\n- a list\n",
            "other:\n  proxy: {}\n",
            "torsrv: proxy\n",
            "torsrv: {}\n",
            "torsrv:\n  proxy: {}\n  control: {}\n",
        ];
        for case in cases {
            let err = parse_yaml(case, "test.yml").unwrap_err();
            assert!(
                matches!(err, Error::MalformedConfig { .. }),
                "expected MalformedConfig for {:?}, got {:?}",
                case,
                err
            );
        }
    }

    #[test]
    fn test_yaml_unknown_role_key() {
        let err = parse_yaml("torsrv:\n  bridge: {}\n", "test.yml").unwrap_err();
        assert!(matches!(err, Error::InvalidRole(r) if r == "bridge"));
    }

    #[test]
    fn test_yaml_missing_file_is_io_error() {
        let err = load_yaml(Path::new("/nonexistent/torsrv.yml")).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
