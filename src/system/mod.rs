//! External collaborators.
//!
//! # Data Flow
//! ```text
//! normalize (control role) → PasswordHasher::hash → HashedControlPassword
//! provision                → AccountManager::{set_uid, set_gid, chown_recursive}
//! ```
//!
//! # Design Decisions
//! - torsrv never implements hashing or account management itself; it
//!   invokes the system tools through these traits
//! - Traits are object-safe so the run sequence takes `&dyn` collaborators
//!   and tests substitute in-memory fakes

pub mod process;

use std::path::Path;

use crate::error::Result;

pub use process::{SystemAccounts, TorPasswordHasher};

/// Turns a control-port password into the value of `HashedControlPassword`.
pub trait PasswordHasher {
    fn hash(&self, plaintext: &str) -> Result<String>;
}

/// Manages the service account the tor daemon runs as.
pub trait AccountManager {
    /// Remap the account's uid.
    fn set_uid(&self, account: &str, uid: u32) -> Result<()>;

    /// Remap the account's primary group gid.
    fn set_gid(&self, account: &str, gid: u32) -> Result<()>;

    /// Give `account` ownership of everything below `path`.
    fn chown_recursive(&self, account: &str, path: &Path) -> Result<()>;
}
