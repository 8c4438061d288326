//! # Raid Director Host
//!
//! A standalone host for the raid director. It loads bot type and location
//! tables from a JSON snapshot, drives the director's lifecycle callbacks,
//! runs one map session and tears it down on SIGINT/SIGTERM.
//!
//! ## Quick Start
//!
//! ```bash
//! # Run with default configuration (creates director-host.toml)
//! director-host
//!
//! # Another snapshot and map
//! director-host --data dumps/server.json --map factory4_day
//!
//! # JSON logging
//! director-host --json-logs --log-level debug
//! ```

pub mod app;
pub mod cli;
pub mod collaborators;
pub mod config;
pub mod error;
pub mod logging;
pub mod signals;

pub use app::{Application, SessionSummary};
pub use cli::CliArgs;
pub use config::{DirectorSettings, HostConfig, LoggingSettings, MonitoringSettings};
pub use error::{HostError, HostResult};

/// Parses the command line, loads the configuration, installs logging and
/// runs the application until shutdown.
pub async fn init() -> HostResult<()> {
    let args = CliArgs::parse();

    let mut config = HostConfig::load_from_file(&args.config_path).await?;
    config.apply_cli(&args);
    config.validate()?;

    logging::setup_logging(&config.logging)?;

    let app = Application::new(config).await?;
    app.run().await
}
