//! Detailed output formatting for a pool config and a pool summary.

use colored::Colorize;

use crate::commands::check::CheckReport;
use crate::output::bps_to_percent;
use crate::runner::RunReport;

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Yes"
    } else {
        "No"
    }
}

pub fn format_config_detail(report: &CheckReport) -> String {
    let config = &report.config;
    let mut output = String::new();

    // Header
    output.push_str(&format!("{}\n", "=".repeat(60)));
    output.push_str(&format!("{}\n", "Pool Config".bold()));
    output.push_str(&format!("{}\n\n", "=".repeat(60)));

    output.push_str(&format!("{}\n", "Accounts".cyan().bold()));
    output.push_str(&format!("  Admin:            {}\n", config.admin));
    output.push_str(&format!("  Pool Account:     {}\n", config.pool_account));
    output.push_str(&format!("  Base Asset:       {}\n", config.base_asset));
    output.push_str(&format!("  Collateral Asset: {}\n\n", config.collateral_asset));

    output.push_str(&format!("{}\n", "Risk Parameters".cyan().bold()));
    output.push_str(&format!("  LTV:                   {}%\n", report.ltv_percent));
    output.push_str(&format!(
        "  Interest Rate:         {}% per year\n",
        report.interest_rate_percent
    ));
    output.push_str(&format!(
        "  Liquidation Threshold: {}%\n",
        report.liquidation_threshold_percent
    ));
    output.push_str(&format!(
        "  Liquidation Penalty:   {}%\n\n",
        report.liquidation_penalty_percent
    ));

    output.push_str(&format!("{}\n", "Flags".cyan().bold()));
    output.push_str(&format!("  Paused:              {}\n", yes_no(config.paused)));
    output.push_str(&format!(
        "  Single Deposit Slot: {}\n\n",
        yes_no(config.single_deposit_slot)
    ));

    output.push_str(&format!("{}\n", "Config is valid".green().bold()));

    output
}

pub fn format_pool_detail(report: &RunReport) -> String {
    let pool = &report.pool;
    let mut output = String::new();

    output.push_str(&format!("{}\n", "Pool".cyan().bold()));
    output.push_str(&format!("  Total Deposits:   {}\n", pool.total_deposits));
    output.push_str(&format!("  Total Borrows:    {}\n", pool.total_borrows));
    output.push_str(&format!("  Total Collateral: {}\n", pool.total_collateral));
    output.push_str(&format!("  Liquidity:        {}\n", report.pool_liquidity));
    output.push_str(&format!(
        "  Utilization:      {}%\n",
        bps_to_percent(pool.utilization_bps().saturating_to::<u64>())
    ));
    output.push_str(&format!("  Yield Index:      {}\n", pool.cumulative_yield_index));
    output.push_str(&format!("  Price:            {}\n", report.price));
    match pool.last_accrual_time {
        Some(time) => output.push_str(&format!("  Last Accrual:     {}\n", time)),
        None => output.push_str("  Last Accrual:     -\n"),
    }
    output.push_str(&format!("  Paused:           {}\n", yes_no(pool.paused)));

    let rejected = report.steps.iter().filter(|s| !s.ok).count();
    if rejected > 0 {
        output.push_str(&format!(
            "\n{}\n",
            format!("{} of {} steps rejected", rejected, report.steps.len())
                .yellow()
                .bold()
        ));
    }

    output
}
