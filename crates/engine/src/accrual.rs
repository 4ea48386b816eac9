//! Interest accrual.
//!
//! Two formulas share the pool's yearly rate:
//!
//! - [`PoolState::accrue_global`] capitalizes interest on `total_borrows` using the
//!   bips path and streams it to depositors through `cumulative_yield_index`.
//!   Depositors are never iterated; each deposit record keeps a checkpoint of the
//!   index and settles `(index - checkpoint) * amount / 10_000` when touched.
//!   The same call advances `cumulative_rate_index` by `rate * elapsed`.
//! - [`calculate_account_interest`] computes one borrower's simple interest from
//!   the growth of `cumulative_rate_index` since the borrow was last touched, so
//!   a rate change never reprices time that has already been accrued.
//!
//! The aggregate compounds on every accrual while each account accrues simple
//! interest between touches, and the two round separately. The aggregate and
//! the sum of the per-account debts therefore drift apart by a bounded amount.

use alloy_primitives::U256;
use tracing::debug;

use crate::error::EngineError;
use crate::math::{checked_add, checked_sub, BPS_SCALE, PERCENT_SCALE, SECONDS_PER_YEAR};
use crate::pool::PoolState;

/// Result of a pool-wide interest calculation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccruedInterest {
    /// Interest added to `total_borrows`
    pub interest: U256,
    /// Increase of `cumulative_yield_index`
    pub yield_delta: U256,
}

impl PoolState {
    /// Brings the pool up to `now`.
    ///
    /// Returns a new `PoolState`; `self` is left untouched so callers can discard
    /// the result when a later step of the operation fails.
    ///
    /// - First call ever: only records `now`.
    /// - No elapsed time: nothing changes.
    /// - No borrows: moves `last_accrual_time` and the rate index only.
    /// - Otherwise adds `total_borrows * rate * dt / (seconds_per_year * 10_000)` to
    ///   `total_borrows` and `interest * 10_000 / total_deposits` to the yield index.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidTimestamp`] if `now` is before the last accrual
    /// - [`EngineError::ArithmeticOverflow`] if an aggregate would overflow
    pub fn accrue_global(&self, now: u64) -> Result<PoolState, EngineError> {
        let mut pool = self.clone();

        let Some(last_accrual) = self.last_accrual_time else {
            pool.last_accrual_time = Some(now);
            return Ok(pool);
        };

        if now < last_accrual {
            return Err(EngineError::InvalidTimestamp {
                now,
                last_accrual,
            });
        }

        let elapsed = now - last_accrual;
        if elapsed == 0 {
            return Ok(pool);
        }
        pool.last_accrual_time = Some(now);

        let rate_time = U256::from(self.risk.interest_rate_bps_per_year)
            .checked_mul(U256::from(elapsed))
            .ok_or(EngineError::ArithmeticOverflow)?;
        pool.cumulative_rate_index = checked_add(pool.cumulative_rate_index, rate_time)?;

        if self.total_borrows.is_zero() {
            return Ok(pool);
        }

        let accrued = get_accrued_interest(
            self.total_borrows,
            self.total_deposits,
            self.risk.interest_rate_bps_per_year,
            elapsed,
        )?;

        pool.cumulative_yield_index = checked_add(pool.cumulative_yield_index, accrued.yield_delta)?;
        pool.total_borrows = checked_add(pool.total_borrows, accrued.interest)?;

        debug!(
            elapsed,
            interest = %accrued.interest,
            yield_delta = %accrued.yield_delta,
            total_borrows = %pool.total_borrows,
            "accrued pool interest"
        );

        Ok(pool)
    }
}

/// Pool-wide interest and the matching yield-index increase for `elapsed` seconds.
pub fn get_accrued_interest(
    total_borrows: U256,
    total_deposits: U256,
    rate_bps_per_year: u32,
    elapsed: u64,
) -> Result<AccruedInterest, EngineError> {
    let interest = total_borrows
        .checked_mul(U256::from(rate_bps_per_year))
        .and_then(|v| v.checked_mul(U256::from(elapsed)))
        .ok_or(EngineError::ArithmeticOverflow)?
        / (U256::from(SECONDS_PER_YEAR) * BPS_SCALE);

    let yield_delta = if total_deposits.is_zero() {
        U256::ZERO
    } else {
        interest
            .checked_mul(BPS_SCALE)
            .ok_or(EngineError::ArithmeticOverflow)?
            / total_deposits
    };

    Ok(AccruedInterest {
        interest,
        yield_delta,
    })
}

/// Simple interest owed on `principal` between two readings of the rate index.
///
/// `principal * (rate_index - rate_checkpoint) / (seconds_per_year * 100 * 100)`:
/// the percent denominator applied to a rate kept in basis points, so rates
/// below 1% and fractional percents accrue in full. A checkpoint ahead of the
/// index is an [`EngineError::ArithmeticOverflow`].
pub fn calculate_account_interest(
    principal: U256,
    rate_checkpoint: U256,
    rate_index: U256,
) -> Result<U256, EngineError> {
    let rate_time = checked_sub(rate_index, rate_checkpoint)?;
    if rate_time.is_zero() || principal.is_zero() {
        return Ok(U256::ZERO);
    }

    let numerator = principal
        .checked_mul(rate_time)
        .ok_or(EngineError::ArithmeticOverflow)?;

    Ok(numerator / (U256::from(SECONDS_PER_YEAR) * PERCENT_SCALE * PERCENT_SCALE))
}
