//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Resolve config → Validate → Render → Provision dirs → Write file
//!     → Repair identity → Exit
//! ```
//!
//! # Design Decisions
//! - Run once, to completion; no background work and no supervision
//! - Fail fast: any error aborts before later steps run
//! - Nothing touches the disk until the configuration has fully validated

pub mod startup;

pub use startup::{run, RunReport};
