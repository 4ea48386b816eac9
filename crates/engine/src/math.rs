//! Integer math shared by the accrual, borrow-limit and liquidation paths.
//!
//! All amounts are [`U256`]. Rates and ratios are basis points (`u32`), where
//! [`BPS_SCALE`] is 100%. A handful of formulas work in whole percent instead,
//! so [`bps_to_percent`] is provided to convert with truncation.

use alloy_primitives::U256;

use crate::error::EngineError;

/// Basis-point scale (10,000 bps = 100%). Also the yield-index scale.
pub const BPS_SCALE: U256 = U256::from_limbs([10_000, 0, 0, 0]);

/// Percent scale (100 = 100%)
pub const PERCENT_SCALE: U256 = U256::from_limbs([100, 0, 0, 0]);

/// Seconds in a 365-day year
pub const SECONDS_PER_YEAR: u64 = 31_536_000;

/// Returns `(x * y) / d` rounded down, or `None` on overflow or `d == 0`.
pub fn mul_div_down(x: U256, y: U256, d: U256) -> Option<U256> {
    if d.is_zero() {
        return None;
    }
    x.checked_mul(y).map(|product| product / d)
}

/// Converts basis points to whole percent, truncating (e.g. 7550 bps -> 75).
pub fn bps_to_percent(bps: u32) -> U256 {
    U256::from(bps / 100)
}

/// Checked addition that maps overflow onto [`EngineError::ArithmeticOverflow`].
pub fn checked_add(x: U256, y: U256) -> Result<U256, EngineError> {
    x.checked_add(y).ok_or(EngineError::ArithmeticOverflow)
}

/// Checked subtraction that maps underflow onto [`EngineError::ArithmeticOverflow`].
pub fn checked_sub(x: U256, y: U256) -> Result<U256, EngineError> {
    x.checked_sub(y).ok_or(EngineError::ArithmeticOverflow)
}

/// Returns `(x * y) / d` rounded down, failing with [`EngineError::ArithmeticOverflow`].
pub fn checked_mul_div(x: U256, y: U256, d: U256) -> Result<U256, EngineError> {
    mul_div_down(x, y, d).ok_or(EngineError::ArithmeticOverflow)
}

/// Returns `max(x - y, 0)`
pub fn zero_floor_sub(x: U256, y: U256) -> U256 {
    x.saturating_sub(y)
}
