//! torsrv: tor container configuration.
//!
//! Turns `ROLE`-style environment variables or a `torsrv.yml` document into
//! a `torrc`, provisions the directories it references and hands ownership
//! to the tor service account.

pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod provision;
pub mod render;
pub mod system;

pub use config::{RunConfig, Settings};
pub use error::{Error, Result};
pub use lifecycle::run;
