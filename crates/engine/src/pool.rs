//! Pool-wide state: aggregates, the yield index and risk parameters.
//!
//! [`PoolState`] is the ledger root. It has no behavior beyond holding the
//! aggregates; interest accrual lives in [`crate::accrual`] and every change
//! goes through [`crate::LendingPool`].

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::math::{mul_div_down, BPS_SCALE};

/// Maximum loan-to-value (90%)
pub const MAX_LTV_BPS: u32 = 9_000;

/// Maximum yearly interest rate (100%)
pub const MAX_INTEREST_RATE_BPS: u32 = 10_000;

/// Maximum liquidation threshold (150%)
pub const MAX_LIQUIDATION_THRESHOLD_BPS: u32 = 15_000;

/// Maximum liquidation penalty (30%)
pub const MAX_LIQUIDATION_PENALTY_BPS: u32 = 3_000;

/// Admin-tunable risk parameters, all in basis points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskParameters {
    /// Loan-to-value limit applied to new or extended borrows
    pub ltv_bps: u32,
    /// Simple yearly interest rate charged to borrowers
    pub interest_rate_bps_per_year: u32,
    /// Debt-to-collateral-value ratio at which a position can be liquidated
    pub liquidation_threshold_bps: u32,
    /// Discount granted to the liquidator on the debt it repays
    pub liquidation_penalty_bps: u32,
}

impl RiskParameters {
    /// Checks every parameter against its upper bound.
    pub fn validate(&self) -> Result<(), EngineError> {
        check_bound("ltv_bps", self.ltv_bps, MAX_LTV_BPS)?;
        check_bound(
            "interest_rate_bps_per_year",
            self.interest_rate_bps_per_year,
            MAX_INTEREST_RATE_BPS,
        )?;
        check_bound(
            "liquidation_threshold_bps",
            self.liquidation_threshold_bps,
            MAX_LIQUIDATION_THRESHOLD_BPS,
        )?;
        check_bound(
            "liquidation_penalty_bps",
            self.liquidation_penalty_bps,
            MAX_LIQUIDATION_PENALTY_BPS,
        )
    }
}

fn check_bound(name: &'static str, value: u32, max: u32) -> Result<(), EngineError> {
    if value > max {
        return Err(EngineError::InvalidParameter { name, value, max });
    }
    Ok(())
}

/// Global aggregates and configuration of a lending pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    /// Sum of all deposit records (base units)
    pub total_deposits: U256,

    /// Outstanding borrows including interest capitalized by accrual (base units)
    pub total_borrows: U256,

    /// Sum of all collateral records (collateral units)
    pub total_collateral: U256,

    /// Yield accumulated per deposited unit, scaled by 10,000. Never decreases.
    pub cumulative_yield_index: U256,

    /// Sum of `interest_rate_bps_per_year * seconds` over every accrued interval.
    /// Borrow records checkpoint it so each debt accrues at the rate in force
    /// during each interval. Never decreases.
    pub cumulative_rate_index: U256,

    /// Timestamp of the last accrual. `None` until the first accrual runs.
    pub last_accrual_time: Option<u64>,

    /// Risk parameters
    pub risk: RiskParameters,

    /// When set, deposits and new borrows are rejected
    pub paused: bool,

    /// Identity allowed to change configuration
    pub admin: Address,

    /// Custody account holding the pool's base and collateral assets
    pub pool_account: Address,

    /// Asset lent and deposited
    pub base_asset: Address,

    /// Asset posted as collateral
    pub collateral_asset: Address,

    /// Reject top-up deposits while an account still holds a balance
    pub single_deposit_slot: bool,
}

impl PoolState {
    /// Creates an empty pool. Aggregates and both indexes start at zero.
    pub fn new(
        admin: Address,
        pool_account: Address,
        base_asset: Address,
        collateral_asset: Address,
        risk: RiskParameters,
    ) -> Self {
        Self {
            total_deposits: U256::ZERO,
            total_borrows: U256::ZERO,
            total_collateral: U256::ZERO,
            cumulative_yield_index: U256::ZERO,
            cumulative_rate_index: U256::ZERO,
            last_accrual_time: None,
            risk,
            paused: false,
            admin,
            pool_account,
            base_asset,
            collateral_asset,
            single_deposit_slot: false,
        }
    }

    /// Returns the pool's utilization in basis points (borrows / deposits).
    ///
    /// Zero deposits with outstanding borrows reports `U256::MAX`.
    pub fn utilization_bps(&self) -> U256 {
        if self.total_deposits.is_zero() {
            if self.total_borrows.is_zero() {
                return U256::ZERO;
            }
            return U256::MAX;
        }
        mul_div_down(self.total_borrows, BPS_SCALE, self.total_deposits).unwrap_or(U256::MAX)
    }
}
