//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation of the normalized model (presence is handled by
//!   the normalizer)
//! - Service invariants: unique directories, at least one port mapping
//! - Reject values that would break the one-directive-per-line grammar
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RunConfig → Result<(), Vec<ValidationError>>
//! - Runs before anything is written to disk

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::schema::{ControlAuth, RoleConfig, RunConfig};

/// A single invariant violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Two services point at the same key directory.
    #[error("services {first} and {second} share HiddenServiceDir {}", .dir.display())]
    DuplicateServiceDir {
        dir: PathBuf,
        first: String,
        second: String,
    },

    /// A service has no `HiddenServicePort` mapping.
    #[error("service {service} has no port mappings")]
    NoPortMappings { service: String },

    /// A directive value is empty.
    #[error("{field} is empty")]
    EmptyValue { field: String },

    /// A directive value contains a line break.
    #[error("{field} contains a line break")]
    LineBreak { field: String },
}

/// Check the invariants of `config`.
pub fn validate(config: &RunConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match &config.role {
        RoleConfig::Service(model) => {
            let mut dirs: HashMap<&PathBuf, &str> = HashMap::new();
            for service in &model.services {
                let field = |directive: &str| format!("{} ({})", directive, service.name);

                check_value(&mut errors, field("HiddenService"), &service.name);
                check_value(
                    &mut errors,
                    field("HiddenServiceDir"),
                    &service.dir.to_string_lossy(),
                );
                if let Some(first) = dirs.insert(&service.dir, &service.name) {
                    errors.push(ValidationError::DuplicateServiceDir {
                        dir: service.dir.clone(),
                        first: first.to_string(),
                        second: service.name.clone(),
                    });
                }

                if service.ports.is_empty() {
                    errors.push(ValidationError::NoPortMappings {
                        service: service.name.clone(),
                    });
                }
                for mapping in service.ports.iter() {
                    check_value(&mut errors, field("HiddenServicePort"), &mapping.virtual_port);
                    check_value(&mut errors, field("HiddenServicePort"), &mapping.target);
                }
            }
        }
        RoleConfig::Proxy(model) => {
            check_value(&mut errors, "SocksPort".into(), &model.port);
            if let Some(address) = &model.address {
                check_value(&mut errors, "SocksPort address".into(), address);
            }
            if model.accept.is_empty() {
                errors.push(ValidationError::EmptyValue {
                    field: "SocksPolicy accept".into(),
                });
            }
            for subnet in &model.accept {
                check_value(&mut errors, "SocksPolicy accept".into(), subnet);
            }
            for subnet in model.reject.iter().flatten() {
                check_value(&mut errors, "SocksPolicy reject".into(), subnet);
            }
        }
        RoleConfig::Control(model) => {
            check_value(&mut errors, "ControlPort".into(), &model.port);
            match &model.auth {
                ControlAuth::HashedPassword(hash) => {
                    check_value(&mut errors, "HashedControlPassword".into(), hash)
                }
                ControlAuth::Cookie(value) => {
                    check_value(&mut errors, "CookieAuthentication".into(), value)
                }
            }
        }
        RoleConfig::Relay => {}
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_value(errors: &mut Vec<ValidationError>, field: String, value: &str) {
    if value.trim().is_empty() {
        errors.push(ValidationError::EmptyValue { field });
    } else if value.contains(['\n', '\r']) {
        errors.push(ValidationError::LineBreak { field });
    }
}
