//! torsrv container entrypoint.
//!
//! # Architecture Overview
//!
//! ```text
//!   env vars / flags ──▶ Settings
//!                           │
//!          ┌────────────────┴────────────────┐
//!          │ YAML_CFG?                        │
//!          ▼                                  ▼
//!   torsrv.yml (YAML wins)            ROLE + role env vars
//!          └────────────────┬────────────────┘
//!                           ▼
//!                  RawConfig (untyped)
//!                           │ normalize + validate
//!                           ▼
//!                  RunConfig (immutable)
//!                  │                 │
//!                  ▼                 ▼
//!              render            provision
//!           (torrc lines)   (dirs, torrc, uid/gid, chown)
//! ```
//!
//! Runs once per container start and exits: `0` on success (including when an
//! existing torrc is kept), `1` on any fatal error.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use torsrv::config::schema::DEFAULT_ACCOUNT;
use torsrv::config::{parse_id, ProcessEnv, Settings, YamlSource};
use torsrv::observability::logging::{init_logging, DEFAULT_FILTER};
use torsrv::system::{SystemAccounts, TorPasswordHasher};

#[derive(Parser, Debug)]
#[command(name = "torsrv")]
#[command(version, about = "Render torrc for a tor container and provision its directories", long_about = None)]
struct Cli {
    /// Function of the tor service: service, proxy, relay or control.
    #[arg(long, env = "ROLE")]
    role: Option<String>,

    /// Use torsrv.yml: a truthy value selects <base>/torsrv.yml, a path selects that file.
    #[arg(long, env = "YAML_CFG", value_name = "FLAG|PATH")]
    yaml_cfg: Option<String>,

    /// Base path for tor configuration and services.
    #[arg(long, env = "BASE_DIR")]
    base_dir: Option<PathBuf>,

    /// Path of the rendered torrc.
    #[arg(long, env = "CFG_PATH")]
    cfg_path: Option<PathBuf>,

    /// Allow an existing torrc to be overwritten (any value enables it).
    #[arg(long, env = "CFG_OVERWRITE", num_args = 0..=1, default_missing_value = "1", value_name = "ANY")]
    cfg_overwrite: Option<String>,

    /// New uid of the service account (empty leaves it unchanged).
    #[arg(long, env = "PUID", value_name = "UID")]
    puid: Option<String>,

    /// New gid of the service account (empty leaves it unchanged).
    #[arg(long, env = "PGID", value_name = "GID")]
    pgid: Option<String>,

    /// Service account the tor daemon runs as.
    #[arg(long, env = "TORSRV_ACCOUNT", default_value = DEFAULT_ACCOUNT)]
    account: String,

    /// tor binary used to hash control passwords.
    #[arg(long, env = "TOR_BIN", default_value = "tor")]
    tor_bin: String,
}

impl Cli {
    fn settings(&self) -> torsrv::Result<Settings> {
        Ok(Settings {
            role: self.role.clone(),
            yaml: YamlSource::from_flag(self.yaml_cfg.as_deref()),
            base_dir: self.base_dir.clone(),
            cfg_path: self.cfg_path.clone(),
            overwrite: self.cfg_overwrite.is_some(),
            uid: parse_id("PUID", self.puid.as_deref())?,
            gid: parse_id("PGID", self.pgid.as_deref())?,
            account: self.account.clone(),
        })
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(DEFAULT_FILTER);

    tracing::info!("torsrv v{} starting", env!("CARGO_PKG_VERSION"));

    let settings = match cli.settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let hasher = TorPasswordHasher::with_program(cli.tor_bin.clone());

    match torsrv::run(&settings, &ProcessEnv, &hasher, &SystemAccounts) {
        Ok(report) => {
            tracing::info!(
                role = %report.config.role(),
                outcome = ?report.provision.write,
                "torsrv finished"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
