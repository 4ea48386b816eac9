//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Lendpool CLI - Check pool configs and run lending scenarios
#[derive(Parser, Debug)]
#[command(name = "lendpool")]
#[command(about = "CLI tool for checking pool configs and running lending scenarios", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "table")]
    pub format: OutputFormat,

    /// Log level for engine events (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn", env = "LENDPOOL_LOG")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a pool config file
    Check(CheckArgs),
    /// Execute a scenario file against an in-memory pool
    Run(RunArgs),
}

#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Path to the pool config (TOML)
    pub config: PathBuf,
}

#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Path to the scenario (TOML)
    pub scenario: PathBuf,

    /// Stop at the first failed step and exit with an error
    #[arg(long)]
    pub fail_fast: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
