//! ewa-cache - Easy-WebApp build cache manager
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use ewa_cache::cache::CacheManager;
use ewa_cache::cli::args::LogFormat;
use ewa_cache::cli::{Cli, Commands};
use ewa_cache::config::ConfigManager;
use ewa_cache::error::{EwaError, EwaResult};
use ewa_cache::session::CacheContext;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> EwaResult<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_format);

    // Explicit path first, then the nearest ewa.toml above the working directory
    let config_manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => {
            let cwd = std::env::current_dir()
                .map_err(|e| EwaError::io("getting current directory", e))?;
            ConfigManager::find_project_config(&cwd)
                .map(ConfigManager::with_path)
                .unwrap_or_default()
        }
    };

    debug!("Using config {}", config_manager.path().display());

    // An explicitly named config file must exist, except for `config` itself
    let config = if cli.config.is_some() && !matches!(cli.command, Commands::Config(_)) {
        config_manager.load_existing().await?
    } else {
        config_manager.load().await?
    };

    if let Commands::Config(args) = cli.command {
        return ewa_cache::cli::commands::config(args, &config, &config_manager).await;
    }

    let mut ctx = CacheContext::from_config(&config)?;
    if let Some(hash) = cli.config_hash {
        ctx = ctx.with_config_hash(hash);
    }
    if cli.no_cache {
        ctx.use_cache = false;
    }
    let manager = CacheManager::new(ctx);

    match cli.command {
        Commands::Config(_) => unreachable!("Config handled above"),
        Commands::Ensure => ewa_cache::cli::commands::ensure(&manager).await,
        Commands::Seal(args) => ewa_cache::cli::commands::seal(args, &manager).await,
        Commands::Status(args) => ewa_cache::cli::commands::status(args, &manager).await,
        Commands::Clear => ewa_cache::cli::commands::clear(&manager).await,
    }
}

/// 0 = warn, 1 = info, 2+ = debug
fn init_logging(verbose: u8, format: LogFormat) {
    let filter = match verbose {
        0 => EnvFilter::new("ewa_cache=warn"),
        1 => EnvFilter::new("ewa_cache=info"),
        _ => EnvFilter::new("ewa_cache=debug"),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Text => builder.without_time().init(),
    }
}
