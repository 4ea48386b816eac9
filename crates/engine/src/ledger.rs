//! Per-account deposit, borrow and collateral records.
//!
//! Records live in ordered maps keyed by account so iteration (snapshots, CLI
//! output, invariant checks) is deterministic. A record whose amount reaches
//! zero is removed rather than kept as an empty entry.

use std::collections::BTreeMap;

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::accrual::calculate_account_interest;
use crate::error::EngineError;
use crate::math::{checked_add, checked_mul_div, checked_sub, BPS_SCALE};

/// A depositor's balance and yield checkpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositRecord {
    /// Deposited base units
    pub amount: U256,
    /// Value of `cumulative_yield_index` when the record was last touched
    pub yield_checkpoint: U256,
    /// Yield earned before a top-up moved the checkpoint, not yet paid out
    pub reserved_yield: U256,
}

impl DepositRecord {
    /// Creates a fresh record checkpointed at `index`
    pub fn new(amount: U256, index: U256) -> Self {
        Self {
            amount,
            yield_checkpoint: index,
            reserved_yield: U256::ZERO,
        }
    }

    /// Yield earned on `amount` since the checkpoint, excluding `reserved_yield`.
    pub fn pending_yield(&self, index: U256) -> Result<U256, EngineError> {
        let delta = checked_sub(index, self.yield_checkpoint)?;
        checked_mul_div(delta, self.amount, BPS_SCALE)
    }

    /// Pending plus reserved yield: what a withdrawal would pay on top of principal.
    pub fn claimable_yield(&self, index: U256) -> Result<U256, EngineError> {
        checked_add(self.pending_yield(index)?, self.reserved_yield)
    }
}

/// A borrower's debt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowRecord {
    /// Debt as of `last_accrued_time`, including interest folded in at that time
    pub principal: U256,
    /// When interest was last folded into `principal`
    pub last_accrued_time: u64,
    /// Value of `cumulative_rate_index` when interest was last folded in
    pub rate_checkpoint: U256,
}

impl BorrowRecord {
    /// Creates a record whose interest starts accruing from `rate_index`
    pub fn new(principal: U256, now: u64, rate_index: U256) -> Self {
        Self {
            principal,
            last_accrued_time: now,
            rate_checkpoint: rate_index,
        }
    }

    /// Principal plus simple interest up to `rate_index`
    pub fn current_owed(&self, rate_index: U256) -> Result<U256, EngineError> {
        let interest =
            calculate_account_interest(self.principal, self.rate_checkpoint, rate_index)?;
        checked_add(self.principal, interest)
    }
}

/// A borrower's posted collateral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralRecord {
    /// Collateral units held by the pool for this account
    pub amount: U256,
    /// Asset the units were posted in; returned or seized in the same asset
    pub asset: Address,
}

/// All per-account records of a pool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLedger {
    deposits: BTreeMap<Address, DepositRecord>,
    borrows: BTreeMap<Address, BorrowRecord>,
    collateral: BTreeMap<Address, CollateralRecord>,
}

impl AccountLedger {
    /// Creates an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deposit(&self, account: &Address) -> Option<&DepositRecord> {
        self.deposits.get(account)
    }

    pub fn borrow(&self, account: &Address) -> Option<&BorrowRecord> {
        self.borrows.get(account)
    }

    pub fn collateral(&self, account: &Address) -> Option<&CollateralRecord> {
        self.collateral.get(account)
    }

    /// Collateral amount for `account`, zero when there is no record
    pub fn collateral_amount(&self, account: &Address) -> U256 {
        self.collateral
            .get(account)
            .map_or(U256::ZERO, |record| record.amount)
    }

    /// Stores a deposit record, deleting it when its amount is zero
    pub fn put_deposit(&mut self, account: Address, record: DepositRecord) {
        if record.amount.is_zero() {
            self.deposits.remove(&account);
        } else {
            self.deposits.insert(account, record);
        }
    }

    /// Stores a borrow record, deleting it when its principal is zero
    pub fn put_borrow(&mut self, account: Address, record: BorrowRecord) {
        if record.principal.is_zero() {
            self.borrows.remove(&account);
        } else {
            self.borrows.insert(account, record);
        }
    }

    /// Stores a collateral record, deleting it when its amount is zero
    pub fn put_collateral(&mut self, account: Address, record: CollateralRecord) {
        if record.amount.is_zero() {
            self.collateral.remove(&account);
        } else {
            self.collateral.insert(account, record);
        }
    }

    /// Deletes both the borrow and collateral records of `account`
    pub fn close_position(&mut self, account: &Address) {
        self.borrows.remove(account);
        self.collateral.remove(account);
    }

    pub fn deposits(&self) -> impl Iterator<Item = (&Address, &DepositRecord)> {
        self.deposits.iter()
    }

    pub fn borrows(&self) -> impl Iterator<Item = (&Address, &BorrowRecord)> {
        self.borrows.iter()
    }

    pub fn collaterals(&self) -> impl Iterator<Item = (&Address, &CollateralRecord)> {
        self.collateral.iter()
    }

    /// Σ deposit amounts; equals `total_deposits` in every reachable state
    pub fn sum_deposits(&self) -> U256 {
        self.deposits
            .values()
            .fold(U256::ZERO, |acc, r| acc.saturating_add(r.amount))
    }

    /// Σ collateral amounts; equals `total_collateral` in every reachable state
    pub fn sum_collateral(&self) -> U256 {
        self.collateral
            .values()
            .fold(U256::ZERO, |acc, r| acc.saturating_add(r.amount))
    }

    /// Σ borrow debts folded forward to `rate_index`
    pub fn sum_owed(&self, rate_index: U256) -> Result<U256, EngineError> {
        self.borrows
            .values()
            .try_fold(U256::ZERO, |acc, r| checked_add(acc, r.current_owed(rate_index)?))
    }
}
