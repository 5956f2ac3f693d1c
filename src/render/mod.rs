//! Directive rendering.
//!
//! # Data Flow
//! ```text
//! RunConfig.role
//!     → service.rs / proxy.rs / control.rs (one renderer per role)
//!     → Vec<String> (one torrc line per element)
//!     → to_text (newline-terminated file contents)
//! ```
//!
//! # Design Decisions
//! - Rendering is a pure function of the RunConfig
//! - Output is deterministic: services render in model order, nothing is
//!   derived from the clock or from hash-map iteration
//! - Comment headers and blank separators are part of the output

pub mod control;
pub mod proxy;
pub mod service;

use crate::config::schema::{RoleConfig, RunConfig};

/// Render the configuration file lines for `config`.
///
/// The relay role renders nothing.
pub fn render(config: &RunConfig) -> Vec<String> {
    let mut lines = Vec::new();
    match &config.role {
        RoleConfig::Service(model) => service::render(model, &mut lines),
        RoleConfig::Proxy(model) => proxy::render(model, &mut lines),
        RoleConfig::Control(model) => control::render(model, &mut lines),
        RoleConfig::Relay => {}
    }
    lines
}

/// Join rendered lines into file contents, each line newline-terminated.
pub fn to_text(lines: &[String]) -> String {
    let mut text = String::with_capacity(lines.iter().map(|l| l.len() + 1).sum());
    for line in lines {
        text.push_str(line);
        text.push('\n');
    }
    text
}
