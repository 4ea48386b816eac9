//! Read-only view of one account's standing in the pool.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::borrow_limit::{collateral_value, max_borrow};
use crate::error::EngineError;
use crate::ledger::AccountLedger;
use crate::liquidation::is_liquidatable;
use crate::math::zero_floor_sub;
use crate::pool::PoolState;

/// Snapshot of an account's deposit and borrow position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPosition {
    /// The account
    pub account: Address,
    /// Deposited base units
    pub deposit: U256,
    /// Yield a full withdrawal would pay on top of `deposit`
    pub claimable_yield: U256,
    /// Recorded borrow principal
    pub principal: U256,
    /// Principal plus interest up to the snapshot time
    pub debt: U256,
    /// Posted collateral units
    pub collateral: U256,
    /// Collateral value in base units at the snapshot price
    pub collateral_value: U256,
    /// Maximum total debt under the current LTV
    pub max_borrow: U256,
    /// Additional amount that could be borrowed without new collateral
    pub borrow_capacity: U256,
    /// Whether the position has crossed the liquidation threshold
    pub liquidatable: bool,
}

impl AccountPosition {
    /// Builds a snapshot against an already accrued `pool`.
    pub fn build(
        account: Address,
        pool: &PoolState,
        ledger: &AccountLedger,
        price: U256,
    ) -> Result<Self, EngineError> {
        let (deposit, claimable_yield) = match ledger.deposit(&account) {
            Some(record) => (
                record.amount,
                record.claimable_yield(pool.cumulative_yield_index)?,
            ),
            None => (U256::ZERO, U256::ZERO),
        };

        let (principal, debt) = match ledger.borrow(&account) {
            Some(record) => (record.principal, record.current_owed(pool.cumulative_rate_index)?),
            None => (U256::ZERO, U256::ZERO),
        };

        let collateral = ledger.collateral_amount(&account);
        let value = collateral_value(collateral, price)?;
        let max = max_borrow(collateral, price, pool.risk.ltv_bps)?;
        let liquidatable = !debt.is_zero()
            && is_liquidatable(debt, value, pool.risk.liquidation_threshold_bps)?;

        Ok(Self {
            account,
            deposit,
            claimable_yield,
            principal,
            debt,
            collateral,
            collateral_value: value,
            max_borrow: max,
            borrow_capacity: zero_floor_sub(max, debt),
            liquidatable,
        })
    }

    /// Whether the account holds an open borrow
    pub fn has_open_borrow(&self) -> bool {
        !self.principal.is_zero()
    }
}
