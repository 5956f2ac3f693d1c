//! Error taxonomy for a torsrv run.
//!
//! Every variant is fatal: the run aborts, `main` logs the message and exits
//! non-zero. The only recoverable condition (an existing configuration file
//! that may not be overwritten) is not an error, see
//! [`WriteOutcome::Skipped`](crate::provision::WriteOutcome::Skipped).

use std::path::PathBuf;
use thiserror::Error;

use crate::config::validation::ValidationError;

/// Errors that can occur while resolving, rendering or provisioning.
#[derive(Debug, Error)]
pub enum Error {
    /// No YAML source and the role argument is not a known role.
    #[error("invalid ROLE {0:?}: expected one of service, proxy, relay, control")]
    InvalidRole(String),

    /// A launcher setting holds a value that cannot be used.
    #[error("invalid {field} {value:?}: {reason}")]
    InvalidSetting {
        /// Environment variable or flag carrying the value.
        field: &'static str,
        /// The value as given.
        value: String,
        /// What was expected instead.
        reason: &'static str,
    },

    /// A field required by the active role is absent.
    #[error("{role} role requires {field}, but it is not set")]
    MissingRequiredField {
        /// Role being configured.
        role: &'static str,
        /// Environment variable or YAML key that is missing.
        field: String,
    },

    /// The YAML document (or a value inside it) has the wrong structure.
    #[error("malformed configuration in {source_name}: {reason}")]
    MalformedConfig {
        /// Where the bad input came from (file path or `environment`).
        source_name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The normalized model violates one or more invariants.
    #[error("invalid configuration: {}", join_errors(.0))]
    Invalid(Vec<ValidationError>),

    /// Reading or writing a file or directory failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being read, written or created.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// An external program (hashing, account management) failed.
    #[error("{program} failed: {reason}")]
    Collaborator {
        /// Program that was invoked.
        program: String,
        /// Exit status or spawn error.
        reason: String,
    },
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_role_and_field() {
        let err = Error::MissingRequiredField {
            role: "proxy",
            field: "PROXY_ACCEPT".into(),
        };
        assert_eq!(err.to_string(), "proxy role requires PROXY_ACCEPT, but it is not set");

        let err = Error::InvalidRole(String::new());
        assert!(err.to_string().contains("invalid ROLE \"\""));

        let err = Error::InvalidSetting {
            field: "PUID",
            value: "abc".into(),
            reason: "expected a numeric id",
        };
        assert_eq!(err.to_string(), "invalid PUID \"abc\": expected a numeric id");
    }

    #[test]
    fn test_invalid_lists_every_violation() {
        let err = Error::Invalid(vec![
            ValidationError::DuplicateServiceDir {
                dir: "/tor/a".into(),
                first: "a".into(),
                second: "b".into(),
            },
            ValidationError::EmptyValue {
                field: "ControlPort".into(),
            },
        ]);
        let msg = err.to_string();
        assert!(msg.contains("/tor/a"));
        assert!(msg.contains("ControlPort"));
    }
}
