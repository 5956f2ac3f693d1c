//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging through `tracing`, every step logs what it did
//! - Output goes to stderr so a container runtime captures it alongside
//!   the daemon's own logs

pub mod logging;

pub use logging::init_logging;
