//! External collaborators: asset transfers, the price oracle and the clock.
//!
//! The engine only talks to these traits. In-memory implementations are provided
//! for tests and for the scenario runner.

use std::collections::HashMap;

use alloy_primitives::{Address, U256};
use tracing::{error, warn};

use crate::error::{OracleError, TransferError};

/// Moves fungible balances between holders.
///
/// Each call must be all-or-nothing: an `Err` means no balance moved.
pub trait AssetTransferService {
    /// Moves `amount` of `asset` from `from` to `to`
    fn transfer(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TransferError>;

    /// Current balance of `holder` in `asset`
    fn balance_of(&self, asset: Address, holder: Address) -> U256;
}

/// Source of the collateral price, in base units per collateral unit.
///
/// Zero is never a valid price; the engine rejects it before use.
pub trait PriceOracle {
    fn get_price(&self) -> Result<U256, OracleError>;
}

/// Monotonic, non-decreasing time source in seconds.
pub trait Clock {
    fn now(&self) -> u64;
}

/// One balance movement of a multi-leg settlement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferLeg {
    pub asset: Address,
    pub from: Address,
    pub to: Address,
    pub amount: U256,
}

/// Executes `legs` in order, all or nothing.
///
/// Zero-amount legs are skipped. When a leg fails, the legs already executed are
/// reversed newest first and the original error is returned.
pub(crate) fn settle<T: AssetTransferService>(
    transfers: &mut T,
    legs: &[TransferLeg],
) -> Result<(), TransferError> {
    for (index, leg) in legs.iter().enumerate() {
        if leg.amount.is_zero() {
            continue;
        }
        if let Err(err) = transfers.transfer(leg.asset, leg.from, leg.to, leg.amount) {
            warn!(leg = index, error = %err, "transfer failed, reversing settled legs");
            unwind(transfers, &legs[..index]);
            return Err(err);
        }
    }
    Ok(())
}

fn unwind<T: AssetTransferService>(transfers: &mut T, settled: &[TransferLeg]) {
    for leg in settled.iter().rev().filter(|leg| !leg.amount.is_zero()) {
        if let Err(err) = transfers.transfer(leg.asset, leg.to, leg.from, leg.amount) {
            error!(
                asset = %leg.asset,
                from = %leg.to,
                to = %leg.from,
                amount = %leg.amount,
                error = %err,
                "failed to reverse settled transfer"
            );
        }
    }
}

/// Balances kept in memory, keyed by (asset, holder).
#[derive(Debug, Clone, Default)]
pub struct InMemoryAssets {
    balances: HashMap<(Address, Address), U256>,
    fail_after: Option<usize>,
}

impl InMemoryAssets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credits `amount` of `asset` to `holder` out of thin air
    pub fn mint(&mut self, asset: Address, holder: Address, amount: U256) {
        let balance = self.balances.entry((asset, holder)).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Lets the next `successes` transfers through, then rejects exactly one
    pub fn fail_after(&mut self, successes: usize) {
        self.fail_after = Some(successes);
    }
}

impl AssetTransferService for InMemoryAssets {
    fn transfer(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), TransferError> {
        match self.fail_after {
            Some(0) => {
                self.fail_after = None;
                return Err(TransferError::Rejected("injected failure".to_string()));
            }
            Some(remaining) => self.fail_after = Some(remaining - 1),
            None => {}
        }

        let available = self.balance_of(asset, from);
        if available < amount {
            return Err(TransferError::InsufficientFunds {
                holder: from,
                asset,
                requested: amount,
                available,
            });
        }

        self.balances.insert((asset, from), available - amount);
        self.mint(asset, to, amount);
        Ok(())
    }

    fn balance_of(&self, asset: Address, holder: Address) -> U256 {
        self.balances
            .get(&(asset, holder))
            .copied()
            .unwrap_or_default()
    }
}

/// Oracle returning a settable price.
#[derive(Debug, Clone, Default)]
pub struct FixedPriceOracle {
    price: U256,
    unavailable: Option<String>,
}

impl FixedPriceOracle {
    pub fn new(price: U256) -> Self {
        Self {
            price,
            unavailable: None,
        }
    }

    pub fn set_price(&mut self, price: U256) {
        self.price = price;
        self.unavailable = None;
    }

    /// Makes every read fail until a price is set again
    pub fn set_unavailable(&mut self, reason: impl Into<String>) {
        self.unavailable = Some(reason.into());
    }
}

impl PriceOracle for FixedPriceOracle {
    fn get_price(&self) -> Result<U256, OracleError> {
        match &self.unavailable {
            Some(reason) => Err(OracleError::Unavailable(reason.clone())),
            None => Ok(self.price),
        }
    }
}

/// Clock moved by hand.
#[derive(Debug, Clone, Copy, Default)]
pub struct ManualClock {
    now: u64,
}

impl ManualClock {
    pub fn new(now: u64) -> Self {
        Self { now }
    }

    pub fn set(&mut self, now: u64) {
        self.now = now;
    }

    pub fn advance(&mut self, seconds: u64) {
        self.now = self.now.saturating_add(seconds);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> u64 {
        self.now
    }
}
