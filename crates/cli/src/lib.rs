//! Shared CLI plumbing for the `gslb-health` and `gslb-distributor`
//! binaries: argument parsing, config loading, logging setup and signal
//! wiring, factored out so both binaries stay a thin `main.rs`.

use clap::Parser;
use gslb_domain::config::{CliOverrides, Config};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Command-line flags common to both processes. Config file paths are
/// resolved relative to `--config-dir` (spec §6's ambient config-file
/// section).
#[derive(Parser, Debug)]
pub struct CommonArgs {
    /// Directory containing gslb-base.yaml, gslb-pools.yaml and the
    /// optional gslb-topology.yaml.
    #[arg(short = 'c', long = "config-dir", value_name = "DIR", default_value = ".")]
    pub config_dir: String,

    /// Overrides the log level from gslb-base.yaml (trace, debug, info,
    /// warn, error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Overrides the install prefix used to derive default PID/control
    /// socket paths.
    #[arg(long = "install-prefix", value_name = "DIR")]
    pub install_prefix: Option<String>,

    /// Overrides the control socket path.
    #[arg(long = "control-socket", value_name = "PATH")]
    pub control_socket_file: Option<String>,
}

impl CommonArgs {
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let overrides = CliOverrides {
            log_level: self.log_level.clone(),
            install_prefix: self.install_prefix.clone(),
            control_socket_file: self.control_socket_file.clone(),
        };
        let config = Config::load(&self.config_dir, overrides)?;
        config.validate()?;
        Ok(config)
    }
}

/// Initializes `tracing-subscriber` from the configured log level, matching
/// the teacher's `fmt()` + `with_max_level` idiom.
pub fn init_logging(config: &Config) {
    let log_level = config
        .base
        .logging
        .level
        .parse()
        .unwrap_or(tracing::Level::INFO);
    tracing_subscriber::fmt()
        .with_target(true)
        .with_thread_ids(false)
        .with_level(true)
        .with_max_level(log_level)
        .init();
}

/// Builds a `CancellationToken` that fires on Ctrl-C, in addition to
/// whatever fires it via the control socket's `stop` command.
pub fn shutdown_token() -> CancellationToken {
    let token = CancellationToken::new();
    let signal_token = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            signal_token.cancel();
        }
    });
    token
}
