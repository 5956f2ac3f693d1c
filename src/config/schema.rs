//! Configuration schema definitions.
//!
//! These are the canonical, role-tagged records produced by the normalizer.
//! All types derive `Serialize` so the resolved configuration can be logged.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::Serialize;

use crate::error::Error;

/// Default base directory for tor state and configuration.
pub const DEFAULT_BASE_DIR: &str = "/tor";

/// File name of the rendered tor configuration inside the base directory.
pub const TORRC_FILE_NAME: &str = "torrc";

/// File name of the YAML document inside the base directory.
pub const YAML_FILE_NAME: &str = "torsrv.yml";

/// Default service account owning the base directory.
pub const DEFAULT_ACCOUNT: &str = "torservice";

/// The function the tor daemon performs in this container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Service,
    Proxy,
    Control,
    Relay,
}

impl Role {
    /// Lowercase name as used by `ROLE` and the YAML section keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Service => "service",
            Role::Proxy => "proxy",
            Role::Control => "control",
            Role::Relay => "relay",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "service" => Ok(Role::Service),
            "proxy" => Ok(Role::Proxy),
            "control" => Ok(Role::Control),
            "relay" => Ok(Role::Relay),
            _ => Err(Error::InvalidRole(s.to_string())),
        }
    }
}

/// One `HiddenServicePort` mapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortMapping {
    /// Port advertised on the onion address.
    pub virtual_port: String,
    /// Local `host:port` the traffic is forwarded to.
    pub target: String,
}

/// Port mappings of a single onion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ServicePorts {
    /// Env-sourced services carry exactly one mapping.
    Single(PortMapping),
    /// YAML-sourced services carry one or more mappings in document order.
    Mapped(Vec<PortMapping>),
}

impl ServicePorts {
    /// Iterate the mappings in render order.
    pub fn iter(&self) -> impl Iterator<Item = &PortMapping> {
        let slice = match self {
            ServicePorts::Single(mapping) => std::slice::from_ref(mapping),
            ServicePorts::Mapped(mappings) => mappings.as_slice(),
        };
        slice.iter()
    }

    /// Number of port mappings.
    pub fn len(&self) -> usize {
        match self {
            ServicePorts::Single(_) => 1,
            ServicePorts::Mapped(mappings) => mappings.len(),
        }
    }

    /// `true` when the service maps no ports.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A single onion service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OnionService {
    /// Unique service name, used only in the comment header.
    pub name: String,
    /// Directory holding the service keys.
    pub dir: PathBuf,
    pub ports: ServicePorts,
}

/// Onion services in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServiceModel {
    pub services: Vec<OnionService>,
}

/// SOCKS proxy settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxyModel {
    /// Listen port.
    pub port: String,
    /// Bind address; `SocksPort` gets an `address:` prefix only when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Subnets allowed to use the proxy (never empty).
    pub accept: Vec<String>,
    /// Subnets refused by the proxy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reject: Option<Vec<String>>,
}

/// Authentication method of the control port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAuth {
    /// Output of the password hashing collaborator.
    HashedPassword(String),
    /// `CookieAuthentication` value.
    Cookie(String),
}

/// Control endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlModel {
    pub port: String,
    pub auth: ControlAuth,
}

/// Role-specific part of the run configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum RoleConfig {
    Service(ServiceModel),
    Proxy(ProxyModel),
    Control(ControlModel),
    /// Accepted but not implemented: renders nothing.
    Relay,
}

impl RoleConfig {
    /// The active role.
    pub fn role(&self) -> Role {
        match self {
            RoleConfig::Service(_) => Role::Service,
            RoleConfig::Proxy(_) => Role::Proxy,
            RoleConfig::Control(_) => Role::Control,
            RoleConfig::Relay => Role::Relay,
        }
    }
}

/// Requested changes to the service account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IdentityConfig {
    /// Account whose ids are remapped and which owns the base directory.
    pub account: String,
    /// New uid (`PUID`).
    pub uid: Option<u32>,
    /// New gid (`PGID`).
    pub gid: Option<u32>,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            account: DEFAULT_ACCOUNT.to_string(),
            uid: None,
            gid: None,
        }
    }
}

/// Root configuration of a run.
///
/// Built once by the loader and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunConfig {
    /// Base directory for tor state.
    pub base_dir: PathBuf,
    /// Where the rendered configuration is written.
    pub cfg_path: PathBuf,
    /// Whether the role section came from the YAML document.
    pub use_yaml: bool,
    /// Whether an existing configuration file may be replaced.
    pub overwrite: bool,
    pub identity: IdentityConfig,
    #[serde(flatten)]
    pub role: RoleConfig,
}

impl RunConfig {
    /// The active role.
    pub fn role(&self) -> Role {
        self.role.role()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parse() {
        assert_eq!("service".parse::<Role>().unwrap(), Role::Service);
        assert_eq!(" Proxy ".parse::<Role>().unwrap(), Role::Proxy);
        assert_eq!("RELAY".parse::<Role>().unwrap(), Role::Relay);
        assert!(matches!("".parse::<Role>(), Err(Error::InvalidRole(_))));
        assert!(matches!("bridge".parse::<Role>(), Err(Error::InvalidRole(r)) if r == "bridge"));
    }

    #[test]
    fn test_service_ports_iter() {
        let single = ServicePorts::Single(PortMapping {
            virtual_port: "80".into(),
            target: "web:80".into(),
        });
        assert_eq!(single.len(), 1);
        assert_eq!(single.iter().next().unwrap().target, "web:80");

        let mapped = ServicePorts::Mapped(vec![]);
        assert!(mapped.is_empty());
    }

    #[test]
    fn test_run_config_serializes_role_tag() {
        let config = RunConfig {
            base_dir: DEFAULT_BASE_DIR.into(),
            cfg_path: "/tor/torrc".into(),
            use_yaml: false,
            overwrite: false,
            identity: IdentityConfig::default(),
            role: RoleConfig::Relay,
        };
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["role"], "relay");
        assert_eq!(json["identity"]["account"], "torservice");
    }
}
