//! Command-line interface for tab-grid.
//!
//! Subcommands replay scripted switcher scenarios and print the default
//! configuration.

use crate::replay::{Scenario, run_scenario};
use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tab_grid_config::{Config, LogLevel};

/// tab-grid - Tab switcher list synchronization engine
#[derive(Parser)]
#[command(name = "tab-grid")]
#[command(author, version = crate::VERSION, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level for the debug log (off, error, warn, info, debug, trace)
    #[arg(long, value_name = "LEVEL", value_parser = parse_log_level, global = true)]
    pub log_level: Option<LogLevel>,

    /// Config file to use instead of the default location
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a scenario file and print the resulting lists
    Replay {
        /// Scenario YAML file
        path: PathBuf,
    },
    /// Print the default configuration as YAML
    DefaultConfig,
}

fn parse_log_level(value: &str) -> Result<LogLevel, String> {
    LogLevel::from_name(value).ok_or_else(|| format!("unknown log level '{value}'"))
}

/// Result of CLI processing
pub enum CliResult {
    /// Subcommand finished, exit with the given code
    Exit(i32),
}

/// Parse the command line and run the chosen subcommand
pub fn process_cli() -> anyhow::Result<CliResult> {
    let cli = Cli::parse();
    crate::debug::init_log_bridge(cli.log_level);

    match cli.command {
        Commands::Replay { path } => {
            let config = load_config(cli.config.as_deref())?;
            // The environment variable wins over an unset config level
            if cli.log_level.is_none() && config.log_level != LogLevel::Off {
                crate::debug::init_log_bridge(Some(config.log_level));
            }
            replay(&path, config)?;
            Ok(CliResult::Exit(0))
        }
        Commands::DefaultConfig => {
            print!("{}", serde_yaml_ng::to_string(&Config::default())?);
            Ok(CliResult::Exit(0))
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => {
            let default_path = Config::config_path();
            if default_path.exists() {
                Config::load_from(&default_path)
                    .with_context(|| format!("failed to load config {}", default_path.display()))
            } else {
                log::info!("No config at {:?}, using defaults", default_path);
                Ok(Config::default())
            }
        }
    }
}

fn replay(path: &Path, config: Config) -> anyhow::Result<()> {
    let scenario = Scenario::from_path(path)?;
    crate::debug_info!(
        "REPLAY",
        "Running {} steps from {}",
        scenario.steps.len(),
        path.display()
    );
    let report = run_scenario(&scenario, config)?;
    print!("{report}");
    Ok(())
}
