//! Output formatting for CLI results.

pub mod detail;
pub mod table;

use rust_decimal::Decimal;

pub use detail::{format_config_detail, format_pool_detail};
pub use table::{format_positions_table, format_steps_table};

/// Basis points as a percentage with two decimals (`7000` -> `70.00`)
pub fn bps_to_percent(bps: u64) -> Decimal {
    Decimal::new(i64::try_from(bps).unwrap_or(i64::MAX), 2)
}
