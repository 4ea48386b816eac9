//! LTV-based admission control for new and extended borrows.

use alloy_primitives::U256;

use crate::error::EngineError;
use crate::math::{checked_add, checked_mul_div, BPS_SCALE};

/// Value of `collateral` in base units at `price` (base units per collateral unit)
pub fn collateral_value(collateral: U256, price: U256) -> Result<U256, EngineError> {
    collateral
        .checked_mul(price)
        .ok_or(EngineError::ArithmeticOverflow)
}

/// Maximum total debt allowed against `collateral`: `collateral * price * ltv / 10_000`
pub fn max_borrow(collateral: U256, price: U256, ltv_bps: u32) -> Result<U256, EngineError> {
    checked_mul_div(
        collateral_value(collateral, price)?,
        U256::from(ltv_bps),
        BPS_SCALE,
    )
}

/// Admits a borrow of `borrow_amount` on top of `current_owed`.
///
/// Returns the new total debt, or [`EngineError::BorrowLimitExceeded`] when it
/// would exceed `max_borrow`. Equality is allowed.
pub fn check_borrow_limit(
    current_owed: U256,
    borrow_amount: U256,
    max_borrow: U256,
) -> Result<U256, EngineError> {
    let new_total = checked_add(current_owed, borrow_amount)?;
    if new_total > max_borrow {
        return Err(EngineError::BorrowLimitExceeded {
            requested: new_total,
            max: max_borrow,
        });
    }
    Ok(new_total)
}
