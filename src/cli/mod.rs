//! Command-line interface definitions.

pub mod check;
pub mod output;
pub mod run;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Coinbook - Live level-2 order books for Coinbase products.
#[derive(Parser, Debug)]
#[command(name = "coinbook")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Stream order books and print the top of each book
    Run(RunArgs),

    /// Run diagnostic checks
    #[command(subcommand)]
    Check(CheckCommand),
}

/// Subcommands for `coinbook check`
#[derive(Subcommand, Debug)]
pub enum CheckCommand {
    /// Validate configuration file
    Config(ConfigPathArg),
}

/// Shared argument for commands that only need a config path.
#[derive(Parser, Debug)]
pub struct ConfigPathArg {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,
}

/// Arguments for the `run` subcommand.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Comma-separated products to track instead of the configured list
    #[arg(long, value_delimiter = ',')]
    pub products: Option<Vec<String>>,

    /// Levels shown per side
    #[arg(long)]
    pub depth: Option<usize>,

    /// Override log level (debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Use JSON log format instead of pretty
    #[arg(long)]
    pub json_logs: bool,
}
