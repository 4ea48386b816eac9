//! Table formatting for scenario steps and account positions.

use colored::Colorize;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};

use crate::runner::{LabeledPosition, StepOutcome};

#[derive(Tabled)]
struct StepRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Action")]
    action: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Time")]
    time: u64,
    #[tabled(rename = "Detail")]
    detail: String,
}

#[derive(Tabled)]
struct PositionRow {
    #[tabled(rename = "Account")]
    account: String,
    #[tabled(rename = "Deposit")]
    deposit: String,
    #[tabled(rename = "Yield")]
    claimable_yield: String,
    #[tabled(rename = "Debt")]
    debt: String,
    #[tabled(rename = "Collateral")]
    collateral: String,
    #[tabled(rename = "Value")]
    collateral_value: String,
    #[tabled(rename = "Capacity")]
    borrow_capacity: String,
    #[tabled(rename = "Liquidatable")]
    liquidatable: String,
}

fn truncate_detail(detail: &str, max_len: usize) -> String {
    if detail.chars().count() > max_len {
        let kept: String = detail.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    } else {
        detail.to_string()
    }
}

pub fn format_steps_table(steps: &[StepOutcome]) -> String {
    if steps.is_empty() {
        return "No steps executed.".to_string();
    }

    let rows: Vec<StepRow> = steps
        .iter()
        .map(|s| StepRow {
            index: s.index,
            action: s.action.to_string(),
            status: if s.ok {
                "ok".green().to_string()
            } else {
                "rejected".red().to_string()
            },
            time: s.time,
            detail: truncate_detail(&s.detail, 90),
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::left()));

    table.to_string()
}

pub fn format_positions_table(positions: &[LabeledPosition]) -> String {
    if positions.is_empty() {
        return "No accounts.".to_string();
    }

    let rows: Vec<PositionRow> = positions
        .iter()
        .map(|p| {
            let position = &p.position;
            PositionRow {
                account: p.label.clone(),
                deposit: position.deposit.to_string(),
                claimable_yield: position.claimable_yield.to_string(),
                debt: position.debt.to_string(),
                collateral: position.collateral.to_string(),
                collateral_value: position.collateral_value.to_string(),
                borrow_capacity: position.borrow_capacity.to_string(),
                liquidatable: if position.liquidatable {
                    "yes".red().bold().to_string()
                } else {
                    "no".to_string()
                },
            }
        })
        .collect();

    let mut table = Table::new(rows);
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::new(1..)).with(Alignment::right()));

    table.to_string()
}
