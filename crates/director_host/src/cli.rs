//! Command-line interface handling for the reference host.
//!
//! Every option overrides the matching entry of the TOML host configuration.

use clap::{Arg, ArgMatches, Command};
use std::path::PathBuf;

/// Default location of the host configuration file.
pub const DEFAULT_HOST_CONFIG: &str = "director-host.toml";

/// Command line arguments parsed from user input.
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Path to the host configuration file
    pub config_path: PathBuf,
    /// Optional override for the host data snapshot
    pub data_path: Option<PathBuf>,
    /// Optional override for the map to run
    pub map: Option<String>,
    /// Optional override for log level
    pub log_level: Option<String>,
    /// Whether to force JSON log output
    pub json_logs: bool,
}

fn command() -> Command {
    Command::new("Raid Director Host")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reference host that drives the raid director over a database snapshot")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Host configuration file path")
                .default_value(DEFAULT_HOST_CONFIG),
        )
        .arg(
            Arg::new("data")
                .short('d')
                .long("data")
                .value_name("FILE")
                .help("JSON snapshot with botTypes and locations tables"),
        )
        .arg(
            Arg::new("map")
                .short('m')
                .long("map")
                .value_name("MAP")
                .help("Map to run a raid session on (e.g., bigmap)"),
        )
        .arg(
            Arg::new("log-level")
                .short('l')
                .long("log-level")
                .value_name("LEVEL")
                .help("Log level (trace, debug, info, warn, error)"),
        )
        .arg(
            Arg::new("json-logs")
                .long("json-logs")
                .help("Output logs in JSON format")
                .action(clap::ArgAction::SetTrue),
        )
}

impl CliArgs {
    /// Parses the process arguments.
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    /// Parses an explicit argument list; the first item is the binary name.
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        command().try_get_matches_from(args).map(|m| Self::from_matches(&m))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        Self {
            config_path: matches
                .get_one::<String>("config")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HOST_CONFIG)),
            data_path: matches.get_one::<String>("data").map(PathBuf::from),
            map: matches.get_one::<String>("map").cloned(),
            log_level: matches.get_one::<String>("log-level").cloned(),
            json_logs: matches.get_flag("json-logs"),
        }
    }
}
