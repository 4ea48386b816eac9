//! Config check command implementation.

use anyhow::{Context, Result};
use lendpool_engine::PoolConfig;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::cli::{CheckArgs, OutputFormat};
use crate::output::{bps_to_percent, format_config_detail};

/// A validated config with its risk parameters as percentages
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub config: PoolConfig,
    pub ltv_percent: Decimal,
    pub interest_rate_percent: Decimal,
    pub liquidation_threshold_percent: Decimal,
    pub liquidation_penalty_percent: Decimal,
}

impl CheckReport {
    pub fn new(config: PoolConfig) -> Self {
        let risk = config.risk;
        Self {
            ltv_percent: bps_to_percent(u64::from(risk.ltv_bps)),
            interest_rate_percent: bps_to_percent(u64::from(risk.interest_rate_bps_per_year)),
            liquidation_threshold_percent: bps_to_percent(u64::from(
                risk.liquidation_threshold_bps,
            )),
            liquidation_penalty_percent: bps_to_percent(u64::from(risk.liquidation_penalty_bps)),
            config,
        }
    }
}

pub fn run_check(args: &CheckArgs, format: OutputFormat) -> Result<()> {
    let config = PoolConfig::load(&args.config)
        .with_context(|| format!("Invalid pool config: {}", args.config.display()))?;
    let report = CheckReport::new(config);

    match format {
        OutputFormat::Table => {
            println!("{}", format_config_detail(&report));
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report)?;
            println!("{}", json);
        }
    }

    Ok(())
}
