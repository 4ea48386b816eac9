//! Liquidation threshold check and incentive calculation.
//!
//! A position is liquidatable once `owed * 100 >= collateral_value * threshold%`.
//! The liquidator repays the debt minus the penalty discount and takes the whole
//! collateral position. Profitability depends on the oracle price at call time.

use alloy_primitives::U256;

use crate::error::EngineError;
use crate::math::{bps_to_percent, checked_mul_div, PERCENT_SCALE};

/// Whether a debt of `owed` against `collateral_value` has crossed the threshold.
///
/// The boundary itself is liquidatable.
pub fn is_liquidatable(
    owed: U256,
    collateral_value: U256,
    liquidation_threshold_bps: u32,
) -> Result<bool, EngineError> {
    let debt_side = owed
        .checked_mul(PERCENT_SCALE)
        .ok_or(EngineError::ArithmeticOverflow)?;
    let collateral_side = collateral_value
        .checked_mul(bps_to_percent(liquidation_threshold_bps))
        .ok_or(EngineError::ArithmeticOverflow)?;
    Ok(debt_side >= collateral_side)
}

/// Amount the liquidator pays: `owed * (100 - penalty%) / 100`
pub fn liquidation_repay_amount(
    owed: U256,
    liquidation_penalty_bps: u32,
) -> Result<U256, EngineError> {
    let payable_percent = PERCENT_SCALE.saturating_sub(bps_to_percent(liquidation_penalty_bps));
    checked_mul_div(owed, payable_percent, PERCENT_SCALE)
}
