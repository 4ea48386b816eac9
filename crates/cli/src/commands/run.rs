//! Scenario run command implementation.

use anyhow::Result;

use crate::cli::{OutputFormat, RunArgs};
use crate::output::{format_pool_detail, format_positions_table, format_steps_table};
use crate::runner::execute;
use crate::scenario::Scenario;

pub fn run_scenario(args: &RunArgs, format: OutputFormat) -> Result<()> {
    let scenario = Scenario::load(&args.scenario)?;
    let report = execute(&scenario, args.fail_fast)?;

    match format {
        OutputFormat::Table => {
            println!("{}", format_steps_table(&report.steps));
            println!("{}", format_pool_detail(&report));
            println!("{}", format_positions_table(&report.positions));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)?;
            println!("{}", json);
        }
    }

    if args.fail_fast {
        if let Some(failed) = report.first_failure() {
            anyhow::bail!(
                "Step {} ({}) failed: {}",
                failed.index,
                failed.action,
                failed.detail
            );
        }
    }

    Ok(())
}
