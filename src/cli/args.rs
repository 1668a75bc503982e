//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// ewa-cache - Persistent build cache for Easy-WebApp
///
/// Validates the asset cache before a build and prunes and seals it
/// afterwards, so repeated builds skip work that is already done.
#[derive(Parser, Debug)]
#[command(name = "ewa-cache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Project configuration file (defaults to the nearest ewa.toml)
    #[arg(short, long, global = true, env = "EWA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Precomputed build configuration fingerprint
    #[arg(long, global = true, env = "EWA_CONFIG_HASH")]
    pub config_hash: Option<String>,

    /// Treat caching as disabled for this run
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Log output format
    #[arg(long, global = true, env = "EWA_LOG_FORMAT", default_value = "text")]
    pub log_format: LogFormat,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate the cache, rebuilding it if it cannot be trusted
    Ensure,

    /// Prune unused items and stamp the cache for the next run
    Seal(SealArgs),

    /// Show whether the cache would be reused, without changing it
    Status(StatusArgs),

    /// Remove the cache directory
    Clear,

    /// Show or initialize configuration
    Config(ConfigArgs),
}

/// Arguments for the seal command
#[derive(Parser, Debug)]
pub struct SealArgs {
    /// Live artifact identities (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub live: Vec<String>,

    /// File listing live artifact identities, one per line
    #[arg(long)]
    pub live_file: Option<PathBuf>,
}

/// Arguments for the status command
#[derive(Parser, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },
}

/// Output format for status
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

/// Format of diagnostic logs on stderr
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Plain text lines
    Text,
    /// One JSON object per event
    Json,
}
