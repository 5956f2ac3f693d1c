//! Role normalization.
//!
//! # Responsibilities
//! - Map a [`RawConfig`] section onto the canonical record of its role
//! - Enforce role-specific required fields
//! - Select the control-port authentication method
//!
//! # Design Decisions
//! - One function per role; each is total over a well-formed section
//! - Optional fields stay `None` rather than being defaulted, except the
//!   control auth fallback `CookieAuthentication 1`
//! - YAML scalars of any type are accepted where a string is expected
//!
//! Authentication precedence for the control role:
//! ```text
//! Password set → hash via PasswordHasher → HashedControlPassword
//! else Cookie set → CookieAuthentication <Cookie>
//! else          → CookieAuthentication 1
//! ```

use serde_yaml::{Mapping, Value};
use tracing::{info, warn};

use crate::config::schema::{
    ControlAuth, ControlModel, OnionService, PortMapping, ProxyModel, Role, RoleConfig,
    ServiceModel, ServicePorts,
};
use crate::config::source::{self, Field, Origin, RawConfig};
use crate::error::{Error, Result};
use crate::system::PasswordHasher;

/// Cookie authentication value used when no method is configured.
pub const DEFAULT_COOKIE: &str = "1";

/// Normalize `raw` into the record of its role.
pub fn normalize(raw: &RawConfig, hasher: &dyn PasswordHasher) -> Result<RoleConfig> {
    match raw.role {
        Role::Service => normalize_service(raw).map(RoleConfig::Service),
        Role::Proxy => normalize_proxy(raw).map(RoleConfig::Proxy),
        Role::Control => normalize_control(raw, hasher).map(RoleConfig::Control),
        Role::Relay => {
            info!("relay role is not implemented yet, no directives will be emitted");
            Ok(RoleConfig::Relay)
        }
    }
}

fn normalize_service(raw: &RawConfig) -> Result<ServiceModel> {
    let services = match &raw.section {
        Value::Mapping(map) if !map.is_empty() => map,
        Value::Null | Value::Mapping(_) => return Err(missing(raw, raw.section_label(&[]))),
        _ => {
            return Err(malformed(
                raw,
                format!("{} must be a mapping of services", raw.section_label(&[])),
            ))
        }
    };

    let empty = Mapping::new();
    let mut model = ServiceModel::default();
    for (key, body) in services {
        let name = scalar(raw, key, &raw.section_label(&[]))?;
        if name.is_empty() {
            return Err(missing(raw, raw.label(&[], source::ONIONSERVICE_NAME)));
        }
        let path = [name.as_str()];
        let body = section_mapping(raw, body, &path)?.unwrap_or(&empty);

        let dir = require(raw, body, &path, source::ONIONSERVICE_DIR)?;
        let ports = match raw.origin {
            Origin::Env => ServicePorts::Single(PortMapping {
                virtual_port: require(raw, body, &path, source::ONIONSERVICE_PORT)?,
                target: require(raw, body, &path, source::ONIONSERVICE_HOST)?,
            }),
            Origin::Yaml => ServicePorts::Mapped(vports(raw, body, &path)?),
        };

        model.services.push(OnionService {
            name,
            dir: dir.into(),
            ports,
        });
    }

    Ok(model)
}

fn vports(raw: &RawConfig, body: &Mapping, path: &[&str]) -> Result<Vec<PortMapping>> {
    let field = source::ONIONSERVICE_VPORTS;
    let label = raw.label(path, field);
    let entries = match get(body, field) {
        None => return Err(missing(raw, label)),
        Some(Value::Mapping(entries)) => entries,
        Some(_) => return Err(malformed(raw, format!("{} must be a mapping of port to host:port", label))),
    };
    if entries.is_empty() {
        return Err(missing(raw, label));
    }

    entries
        .iter()
        .map(|(vport, target)| {
            Ok(PortMapping {
                virtual_port: scalar(raw, vport, &label)?,
                target: scalar(raw, target, &label)?,
            })
        })
        .collect()
}

fn normalize_proxy(raw: &RawConfig) -> Result<ProxyModel> {
    let empty = Mapping::new();
    let body = section_mapping(raw, &raw.section, &[])?.unwrap_or(&empty);

    let port = require(raw, body, &[], source::PROXY_PORT)?;
    let address = optional(raw, body, &[], source::PROXY_ADDRESS)?;
    let accept = match get(body, source::PROXY_ACCEPT) {
        Some(value) => subnet_list(raw, value, source::PROXY_ACCEPT)?,
        None => Vec::new(),
    };
    if accept.is_empty() {
        return Err(missing(raw, raw.label(&[], source::PROXY_ACCEPT)));
    }
    let reject = match get(body, source::PROXY_REJECT) {
        Some(value) => Some(subnet_list(raw, value, source::PROXY_REJECT)?).filter(|l| !l.is_empty()),
        None => None,
    };

    Ok(ProxyModel {
        port,
        address,
        accept,
        reject,
    })
}

fn normalize_control(raw: &RawConfig, hasher: &dyn PasswordHasher) -> Result<ControlModel> {
    let empty = Mapping::new();
    let body = section_mapping(raw, &raw.section, &[])?.unwrap_or(&empty);

    let port = require(raw, body, &[], source::CONTROL_PORT)?;
    let password = optional(raw, body, &[], source::CONTROL_PASSWORD)?;
    let cookie = optional(raw, body, &[], source::CONTROL_COOKIE)?;

    let auth = match (password, cookie) {
        (Some(password), cookie) => {
            if cookie.is_some() {
                warn!(
                    field = %raw.label(&[], source::CONTROL_COOKIE),
                    "Both password and cookie set, using password authentication"
                );
            }
            ControlAuth::HashedPassword(hasher.hash(&password)?)
        }
        (None, Some(cookie)) => ControlAuth::Cookie(cookie),
        (None, None) => ControlAuth::Cookie(DEFAULT_COOKIE.to_string()),
    };

    Ok(ControlModel { port, auth })
}

/// Lookup treating `~`/null as absent.
fn get<'a>(map: &'a Mapping, field: Field) -> Option<&'a Value> {
    map.get(field.yaml).filter(|v| !v.is_null())
}

/// `None` for an empty (null) section.
fn section_mapping<'a>(
    raw: &RawConfig,
    value: &'a Value,
    path: &[&str],
) -> Result<Option<&'a Mapping>> {
    match value {
        Value::Mapping(map) => Ok(Some(map)),
        Value::Null => Ok(None),
        _ => Err(malformed(
            raw,
            format!("{} must be a mapping", raw.section_label(path)),
        )),
    }
}

fn require(raw: &RawConfig, map: &Mapping, path: &[&str], field: Field) -> Result<String> {
    optional(raw, map, path, field)?.ok_or_else(|| missing(raw, raw.label(path, field)))
}

fn optional(raw: &RawConfig, map: &Mapping, path: &[&str], field: Field) -> Result<Option<String>> {
    match get(map, field) {
        Some(value) => {
            let value = scalar(raw, value, &raw.label(path, field))?;
            Ok(Some(value).filter(|v| !v.is_empty()))
        }
        None => Ok(None),
    }
}

/// Render a YAML scalar as the string tor expects.
fn scalar(raw: &RawConfig, value: &Value, label: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.trim().to_string()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(true) => Ok("1".to_string()),
        Value::Bool(false) => Ok("0".to_string()),
        _ => Err(malformed(raw, format!("{} must be a scalar value", label))),
    }
}

/// Accepts `"a, b"` or a sequence of scalars.
fn subnet_list(raw: &RawConfig, value: &Value, field: Field) -> Result<Vec<String>> {
    let label = raw.label(&[], field);
    let items = match value {
        Value::Sequence(items) => items
            .iter()
            .map(|item| scalar(raw, item, &label))
            .collect::<Result<Vec<_>>>()?,
        other => vec![scalar(raw, other, &label)?],
    };

    Ok(items
        .iter()
        .flat_map(|item| item.split(','))
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect())
}

fn missing(raw: &RawConfig, field: String) -> Error {
    Error::MissingRequiredField {
        role: raw.role.as_str(),
        field,
    }
}

fn malformed(raw: &RawConfig, reason: String) -> Error {
    Error::MalformedConfig {
        source_name: raw.source_name.clone(),
        reason,
    }
}
