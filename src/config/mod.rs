//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! YAML_CFG set?
//!   yes → source.rs (torsrv.yml)  ─┐
//!   no  → source.rs (ROLE + env)  ─┴→ RawConfig (untyped, role-tagged)
//!     → resolver.rs (precedence, active role, paths)
//!     → normalize.rs (per-role canonical record)
//!     → validation.rs (semantic checks)
//!     → RunConfig (validated, immutable)
//!     → render / provision
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - YAML always takes precedence over environment variables
//! - Presence checks are explicit; a missing field is never inferred from an
//!   unrelated failure

pub mod loader;
pub mod normalize;
pub mod resolver;
pub mod schema;
pub mod source;
pub mod validation;

pub use loader::load_run_config;
pub use resolver::{parse_id, Settings, YamlSource};
pub use schema::{
    ControlAuth, ControlModel, IdentityConfig, OnionService, PortMapping, ProxyModel, Role,
    RoleConfig, RunConfig, ServiceModel, ServicePorts,
};
pub use source::{EnvSource, ProcessEnv};
