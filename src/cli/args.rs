//! CLI argument definitions.

use crate::cli::validators::{parse_host, parse_port};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Photo-based cat identity recognition service.
#[derive(Debug, Parser)]
#[command(name = "whisker")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run (default: serve).
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "WHISKER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Signing secret (overrides config).
    #[arg(long, global = true, env = "WHISKER_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Only log warnings and errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace+ORT info, -vvv: trace+ORT debug).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Server options used when no subcommand is given.
    #[command(flatten)]
    pub serve: ServeArgs,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Load the models and serve the recognition endpoint.
    Serve(ServeArgs),
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Validate configuration, model files and identity tables.
    Check,
    /// Print the signature a client must send for a photo.
    Sign {
        /// Photo file to sign.
        photo: PathBuf,
        /// Unix timestamp to sign.
        #[arg(long, allow_hyphen_values = true, conflicts_with = "now")]
        timestamp: Option<i64>,
        /// Sign with the current time.
        #[arg(long)]
        now: bool,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Server bind overrides.
#[derive(Debug, Clone, Default, Args)]
pub struct ServeArgs {
    /// Bind address (overrides config).
    #[arg(long, value_parser = parse_host, env = "WHISKER_HOST")]
    pub host: Option<String>,

    /// Bind port (overrides config).
    #[arg(short, long, value_parser = parse_port, env = "WHISKER_PORT")]
    pub port: Option<u16>,
}
