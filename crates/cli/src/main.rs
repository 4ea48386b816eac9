//! Lendpool CLI - Check pool configs and run lending scenarios.

mod cli;
mod commands;
mod output;
mod runner;
mod scenario;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cli::{Cli, Commands};
use commands::{run_check, run_scenario};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Check(args) => run_check(&args, cli.format)?,
        Commands::Run(args) => run_scenario(&args, cli.format)?,
    }

    Ok(())
}

/// Engine events go to stderr so stdout stays parseable.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
