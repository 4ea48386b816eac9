//! The lending pool and its entry points.
//!
//! Every mutating entry point has the same shape:
//!
//! 1. Validate arguments against the current ledger.
//! 2. Accrue interest into a *copy* of [`PoolState`] at the clock's time.
//! 3. Compute the new records and aggregates on local values, checking every
//!    precondition (price, borrow limit, liquidity).
//! 4. Settle the asset transfers.
//! 5. Commit the accrued pool and the records.
//!
//! Nothing is written before step 5, so an error at any step leaves the pool,
//! the ledger and all balances unchanged.
//!
//! # Example
//!
//! ```rust
//! use alloy_primitives::{Address, U256};
//! use lendpool_engine::{
//!     FixedPriceOracle, InMemoryAssets, LendingPool, ManualClock, PoolConfig, RiskParameters,
//! };
//!
//! let config = PoolConfig {
//!     admin: Address::with_last_byte(0xaa),
//!     pool_account: Address::with_last_byte(0xff),
//!     base_asset: Address::with_last_byte(0xb0),
//!     collateral_asset: Address::with_last_byte(0xc0),
//!     paused: false,
//!     single_deposit_slot: false,
//!     risk: RiskParameters {
//!         ltv_bps: 7_000,
//!         interest_rate_bps_per_year: 1_000,
//!         liquidation_threshold_bps: 8_000,
//!         liquidation_penalty_bps: 500,
//!     },
//! };
//!
//! let alice = Address::with_last_byte(1);
//! let mut assets = InMemoryAssets::new();
//! assets.mint(config.base_asset, alice, U256::from(1_000));
//!
//! let mut pool = LendingPool::new(
//!     config,
//!     assets,
//!     FixedPriceOracle::new(U256::from(100)),
//!     ManualClock::new(1_700_000_000),
//! )
//! .unwrap();
//!
//! pool.deposit(alice, U256::from(1_000)).unwrap();
//! assert_eq!(pool.pool().total_deposits, U256::from(1_000));
//! ```

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::borrow_limit::{check_borrow_limit, collateral_value, max_borrow};
use crate::collaborators::{settle, AssetTransferService, Clock, PriceOracle, TransferLeg};
use crate::config::PoolConfig;
use crate::error::EngineError;
use crate::ledger::{AccountLedger, BorrowRecord, CollateralRecord, DepositRecord};
use crate::liquidation::{is_liquidatable, liquidation_repay_amount};
use crate::math::{checked_add, checked_sub, zero_floor_sub};
use crate::pool::{PoolState, RiskParameters};
use crate::position::AccountPosition;

/// Outcome of a successful withdrawal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    /// Deposit principal returned
    pub amount: U256,
    /// Yield paid on top of the principal
    pub yield_paid: U256,
}

impl Withdrawal {
    /// Total base units sent to the depositor
    pub fn total(&self) -> U256 {
        self.amount.saturating_add(self.yield_paid)
    }
}

/// Outcome of a successful repayment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repayment {
    /// Debt paid, principal plus interest
    pub repaid: U256,
    /// Collateral returned to the borrower
    pub collateral_returned: U256,
}

/// Outcome of a successful liquidation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Liquidation {
    /// Debt removed from the books
    pub debt_cleared: U256,
    /// Amount the liquidator paid
    pub repay_amount: U256,
    /// Collateral transferred to the liquidator
    pub collateral_seized: U256,
}

/// A collateralized lending pool.
///
/// Owns the pool state, the account ledger and its collaborators. All mutating
/// entry points take `&mut self`; a multi-threaded host serializes calls by
/// wrapping the pool in a `Mutex`.
#[derive(Debug)]
pub struct LendingPool<T, O, C> {
    pool: PoolState,
    ledger: AccountLedger,
    transfers: T,
    oracle: O,
    clock: C,
}

impl<T, O, C> LendingPool<T, O, C>
where
    T: AssetTransferService,
    O: PriceOracle,
    C: Clock,
{
    /// Creates a pool from a validated config.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidParameter`] if a risk parameter is out of bounds
    pub fn new(config: PoolConfig, transfers: T, oracle: O, clock: C) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self {
            pool: config.initial_state(),
            ledger: AccountLedger::new(),
            transfers,
            oracle,
            clock,
        })
    }

    // ==================== Deposits ====================

    /// Deposits `amount` of the base asset for `account`.
    ///
    /// A top-up first reserves the yield earned on the previous balance, then
    /// moves the checkpoint to the current index.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Paused`] if the pool is paused
    /// - [`EngineError::InvalidAmount`] if `amount` is zero
    /// - [`EngineError::DepositSlotOccupied`] if single-slot deposits are enforced
    ///   and the account already holds a balance
    /// - [`EngineError::Transfer`] if the account cannot fund the deposit
    pub fn deposit(&mut self, account: Address, amount: U256) -> Result<(), EngineError> {
        if self.pool.paused {
            return Err(EngineError::Paused);
        }
        if amount.is_zero() {
            return Err(EngineError::InvalidAmount);
        }
        self.ensure_deposit_slot_free(account)?;

        let now = self.clock.now();
        let mut pool = self.pool.accrue_global(now)?;
        let index = pool.cumulative_yield_index;

        let record = match self.ledger.deposit(&account) {
            Some(existing) => DepositRecord {
                amount: checked_add(existing.amount, amount)?,
                yield_checkpoint: index,
                reserved_yield: existing.claimable_yield(index)?,
            },
            None => DepositRecord::new(amount, index),
        };
        pool.total_deposits = checked_add(pool.total_deposits, amount)?;

        settle(
            &mut self.transfers,
            &[TransferLeg {
                asset: pool.base_asset,
                from: account,
                to: pool.pool_account,
                amount,
            }],
        )?;

        self.pool = pool;
        self.ledger.put_deposit(account, record);
        info!(%account, %amount, total_deposits = %self.pool.total_deposits, "deposit");
        Ok(())
    }

    /// Withdraws `amount` of principal plus all yield earned so far.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotFound`] if the account has no deposit
    /// - [`EngineError::InvalidAmount`] if `amount` is zero
    /// - [`EngineError::InsufficientBalance`] if `amount` exceeds the deposit
    /// - [`EngineError::InsufficientLiquidity`] if pool holdings cannot cover
    ///   `amount` plus yield
    pub fn withdraw(&mut self, account: Address, amount: U256) -> Result<Withdrawal, EngineError> {
        let record = self
            .ledger
            .deposit(&account)
            .cloned()
            .ok_or(EngineError::NotFound { account })?;
        if amount.is_zero() {
            return Err(EngineError::InvalidAmount);
        }
        if amount > record.amount {
            return Err(EngineError::InsufficientBalance {
                account,
                requested: amount,
                available: record.amount,
            });
        }

        let now = self.clock.now();
        let mut pool = self.pool.accrue_global(now)?;
        let index = pool.cumulative_yield_index;

        let yield_paid = record.claimable_yield(index)?;
        let remaining = DepositRecord::new(record.amount - amount, index);
        pool.total_deposits = checked_sub(pool.total_deposits, amount)?;

        let payout = checked_add(amount, yield_paid)?;
        let available = self.available_liquidity();
        if available < payout {
            return Err(EngineError::InsufficientLiquidity {
                requested: payout,
                available,
            });
        }

        settle(
            &mut self.transfers,
            &[TransferLeg {
                asset: pool.base_asset,
                from: pool.pool_account,
                to: account,
                amount: payout,
            }],
        )?;

        self.pool = pool;
        self.ledger.put_deposit(account, remaining);
        info!(%account, %amount, %yield_paid, total_deposits = %self.pool.total_deposits, "withdraw");
        Ok(Withdrawal { amount, yield_paid })
    }

    // ==================== Borrows ====================

    /// Posts `additional_collateral` and borrows `borrow_amount` against the
    /// account's total collateral.
    ///
    /// Interest owed since the account's last touch is folded into the new
    /// principal. Only the newly disbursed amount is added to `total_borrows`;
    /// pool accrual has already capitalized the rest.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Paused`] if the pool is paused
    /// - [`EngineError::InvalidAmount`] if `borrow_amount` is zero
    /// - [`EngineError::BorrowLimitExceeded`] without any collateral, or when the
    ///   new total debt exceeds `collateral * price * ltv`
    /// - [`EngineError::InvalidPrice`] if the oracle reports zero
    /// - [`EngineError::InsufficientLiquidity`] if pool holdings are below `borrow_amount`
    /// - [`EngineError::CollateralAssetMismatch`] if new collateral is offered
    ///   after the pool switched collateral assets under an open position
    pub fn borrow(
        &mut self,
        account: Address,
        additional_collateral: U256,
        borrow_amount: U256,
    ) -> Result<(), EngineError> {
        if self.pool.paused {
            return Err(EngineError::Paused);
        }
        if borrow_amount.is_zero() {
            return Err(EngineError::InvalidAmount);
        }
        let existing_collateral = self.ledger.collateral_amount(&account);
        if existing_collateral.is_zero() && additional_collateral.is_zero() {
            return Err(EngineError::BorrowLimitExceeded {
                requested: borrow_amount,
                max: U256::ZERO,
            });
        }
        let collateral_asset = self.posted_collateral_asset(&account);
        if !additional_collateral.is_zero() && collateral_asset != self.pool.collateral_asset {
            return Err(EngineError::CollateralAssetMismatch {
                account,
                posted: collateral_asset,
                current: self.pool.collateral_asset,
            });
        }

        let now = self.clock.now();
        let mut pool = self.pool.accrue_global(now)?;
        let price = self.read_price()?;
        let rate_index = pool.cumulative_rate_index;

        let total_collateral = checked_add(existing_collateral, additional_collateral)?;
        let max = max_borrow(total_collateral, price, pool.risk.ltv_bps)?;
        let current_owed = self.owed_at(&account, rate_index)?;
        let new_total = check_borrow_limit(current_owed, borrow_amount, max)?;

        let available = self.available_liquidity();
        if available < borrow_amount {
            return Err(EngineError::InsufficientLiquidity {
                requested: borrow_amount,
                available,
            });
        }

        pool.total_borrows = checked_add(pool.total_borrows, borrow_amount)?;
        pool.total_collateral = checked_add(pool.total_collateral, additional_collateral)?;

        settle(
            &mut self.transfers,
            &[
                TransferLeg {
                    asset: collateral_asset,
                    from: account,
                    to: pool.pool_account,
                    amount: additional_collateral,
                },
                TransferLeg {
                    asset: pool.base_asset,
                    from: pool.pool_account,
                    to: account,
                    amount: borrow_amount,
                },
            ],
        )?;

        self.pool = pool;
        self.ledger.put_collateral(
            account,
            CollateralRecord {
                amount: total_collateral,
                asset: collateral_asset,
            },
        );
        self.ledger.put_borrow(account, BorrowRecord::new(new_total, now, rate_index));
        info!(
            %account,
            %borrow_amount,
            %additional_collateral,
            principal = %new_total,
            %price,
            "borrow"
        );
        Ok(())
    }

    /// Repays the whole debt and returns the whole collateral balance.
    ///
    /// Partial repayment is not supported: a position closes in full.
    ///
    /// # Errors
    ///
    /// - [`EngineError::NotFound`] if the account has no open borrow
    /// - [`EngineError::Transfer`] if the account cannot pay the debt
    pub fn repay(&mut self, account: Address) -> Result<Repayment, EngineError> {
        let borrow = self
            .ledger
            .borrow(&account)
            .filter(|record| !record.principal.is_zero())
            .cloned()
            .ok_or(EngineError::NotFound { account })?;

        let now = self.clock.now();
        let mut pool = self.pool.accrue_global(now)?;

        let owed = borrow.current_owed(pool.cumulative_rate_index)?;
        let collateral = self.ledger.collateral_amount(&account);
        let collateral_asset = self.posted_collateral_asset(&account);

        pool.total_borrows = release_borrows(pool.total_borrows, owed);
        pool.total_collateral = checked_sub(pool.total_collateral, collateral)?;

        settle(
            &mut self.transfers,
            &[
                TransferLeg {
                    asset: pool.base_asset,
                    from: account,
                    to: pool.pool_account,
                    amount: owed,
                },
                TransferLeg {
                    asset: collateral_asset,
                    from: pool.pool_account,
                    to: account,
                    amount: collateral,
                },
            ],
        )?;

        self.pool = pool;
        self.ledger.close_position(&account);
        info!(%account, repaid = %owed, collateral_returned = %collateral, "repay");
        Ok(Repayment {
            repaid: owed,
            collateral_returned: collateral,
        })
    }

    // ==================== Liquidation ====================

    /// Closes `target`'s position on behalf of `liquidator`.
    ///
    /// The liquidator pays the debt minus the penalty discount and receives the
    /// whole collateral position.
    ///
    /// # Errors
    ///
    /// - [`EngineError::CannotLiquidate`] if the target has no borrow or no
    ///   collateral, or the position is below the liquidation threshold
    /// - [`EngineError::InvalidPrice`] if the oracle reports zero
    /// - [`EngineError::Transfer`] if the liquidator cannot pay
    pub fn liquidate(
        &mut self,
        liquidator: Address,
        target: Address,
    ) -> Result<Liquidation, EngineError> {
        let (Some(borrow), Some(collateral)) = (
            self.ledger.borrow(&target).cloned(),
            self.ledger.collateral(&target).cloned(),
        ) else {
            return Err(EngineError::CannotLiquidate { account: target });
        };

        let now = self.clock.now();
        let mut pool = self.pool.accrue_global(now)?;
        let price = self.read_price()?;

        let owed = borrow.current_owed(pool.cumulative_rate_index)?;
        let value = collateral_value(collateral.amount, price)?;
        if !is_liquidatable(owed, value, pool.risk.liquidation_threshold_bps)? {
            debug!(%target, %owed, collateral_value = %value, "position above liquidation threshold");
            return Err(EngineError::CannotLiquidate { account: target });
        }
        let repay_amount = liquidation_repay_amount(owed, pool.risk.liquidation_penalty_bps)?;

        pool.total_borrows = release_borrows(pool.total_borrows, owed);
        pool.total_collateral = checked_sub(pool.total_collateral, collateral.amount)?;

        settle(
            &mut self.transfers,
            &[
                TransferLeg {
                    asset: pool.base_asset,
                    from: liquidator,
                    to: pool.pool_account,
                    amount: repay_amount,
                },
                TransferLeg {
                    asset: collateral.asset,
                    from: pool.pool_account,
                    to: liquidator,
                    amount: collateral.amount,
                },
            ],
        )?;

        self.pool = pool;
        self.ledger.close_position(&target);
        info!(
            %liquidator,
            %target,
            debt_cleared = %owed,
            %repay_amount,
            collateral_seized = %collateral.amount,
            %price,
            "liquidate"
        );
        Ok(Liquidation {
            debt_cleared: owed,
            repay_amount,
            collateral_seized: collateral.amount,
        })
    }

    // ==================== Admin ====================

    /// Pauses or unpauses deposits and new borrows
    pub fn set_paused(&mut self, caller: Address, paused: bool) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        self.pool.paused = paused;
        info!(%caller, paused, "set paused");
        Ok(())
    }

    /// Hands admin rights to `new_admin`
    pub fn set_admin(&mut self, caller: Address, new_admin: Address) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        self.pool.admin = new_admin;
        info!(%caller, %new_admin, "set admin");
        Ok(())
    }

    /// Replaces the risk parameters.
    ///
    /// The pool is accrued at the old rate first so the new rate only applies
    /// from now on.
    ///
    /// # Errors
    ///
    /// - [`EngineError::Unauthorized`] if `caller` is not the admin
    /// - [`EngineError::InvalidParameter`] if a parameter is out of bounds
    pub fn set_risk_parameters(
        &mut self,
        caller: Address,
        risk: RiskParameters,
    ) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        risk.validate()?;

        let mut pool = self.pool.accrue_global(self.clock.now())?;
        pool.risk = risk;
        self.pool = pool;
        info!(
            %caller,
            ltv_bps = risk.ltv_bps,
            interest_rate_bps_per_year = risk.interest_rate_bps_per_year,
            liquidation_threshold_bps = risk.liquidation_threshold_bps,
            liquidation_penalty_bps = risk.liquidation_penalty_bps,
            "set risk parameters"
        );
        Ok(())
    }

    /// Points the pool at a different collateral asset for new positions.
    ///
    /// Open positions keep the asset they were posted in and are repaid or
    /// liquidated in it.
    pub fn set_collateral_asset_reference(
        &mut self,
        caller: Address,
        asset: Address,
    ) -> Result<(), EngineError> {
        self.ensure_admin(caller)?;
        if !self.pool.total_collateral.is_zero() {
            warn!(
                %asset,
                total_collateral = %self.pool.total_collateral,
                "collateral asset changed while collateral is posted, open positions keep their asset"
            );
        }
        self.pool.collateral_asset = asset;
        info!(%caller, %asset, "set collateral asset");
        Ok(())
    }

    // ==================== Queries ====================

    /// Current pool state as of the last committed operation
    pub fn pool(&self) -> &PoolState {
        &self.pool
    }

    pub fn ledger(&self) -> &AccountLedger {
        &self.ledger
    }

    pub fn deposit_of(&self, account: &Address) -> Option<&DepositRecord> {
        self.ledger.deposit(account)
    }

    pub fn borrow_of(&self, account: &Address) -> Option<&BorrowRecord> {
        self.ledger.borrow(account)
    }

    pub fn collateral_of(&self, account: &Address) -> Option<&CollateralRecord> {
        self.ledger.collateral(account)
    }

    /// Base-asset holdings of the pool available for payouts
    pub fn available_liquidity(&self) -> U256 {
        self.transfers
            .balance_of(self.pool.base_asset, self.pool.pool_account)
    }

    /// Principal plus interest owed by `account` at the clock's current time
    pub fn current_debt(&self, account: &Address) -> Result<U256, EngineError> {
        let pool = self.pool.accrue_global(self.clock.now())?;
        self.owed_at(account, pool.cumulative_rate_index)
    }

    /// Yield a full withdrawal would pay `account` right now.
    ///
    /// Accrues a throwaway copy of the pool; committed state is not touched.
    pub fn pending_yield(&self, account: &Address) -> Result<U256, EngineError> {
        let Some(record) = self.ledger.deposit(account) else {
            return Ok(U256::ZERO);
        };
        let pool = self.pool.accrue_global(self.clock.now())?;
        record.claimable_yield(pool.cumulative_yield_index)
    }

    /// Additional amount `account` could borrow after posting `additional_collateral`
    pub fn borrow_capacity(
        &self,
        account: &Address,
        additional_collateral: U256,
    ) -> Result<U256, EngineError> {
        let price = self.read_price()?;
        let collateral = checked_add(self.ledger.collateral_amount(account), additional_collateral)?;
        let max = max_borrow(collateral, price, self.pool.risk.ltv_bps)?;
        Ok(zero_floor_sub(max, self.current_debt(account)?))
    }

    /// Whether `account` could be liquidated at the current price and time
    pub fn is_liquidatable(&self, account: &Address) -> Result<bool, EngineError> {
        Ok(self.position(account)?.liquidatable)
    }

    /// Snapshot of `account` at the current price and time
    pub fn position(&self, account: &Address) -> Result<AccountPosition, EngineError> {
        let pool = self.pool.accrue_global(self.clock.now())?;
        let price = self.read_price()?;
        AccountPosition::build(*account, &pool, &self.ledger, price)
    }

    // ==================== Collaborator access ====================

    pub fn transfers(&self) -> &T {
        &self.transfers
    }

    pub fn transfers_mut(&mut self) -> &mut T {
        &mut self.transfers
    }

    pub fn oracle_mut(&mut self) -> &mut O {
        &mut self.oracle
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    // ==================== Internals ====================

    fn ensure_admin(&self, caller: Address) -> Result<(), EngineError> {
        if caller != self.pool.admin {
            return Err(EngineError::Unauthorized { caller });
        }
        Ok(())
    }

    /// One active deposit per account, when the pool is configured for it
    fn ensure_deposit_slot_free(&self, account: Address) -> Result<(), EngineError> {
        if self.pool.single_deposit_slot && self.ledger.deposit(&account).is_some() {
            return Err(EngineError::DepositSlotOccupied { account });
        }
        Ok(())
    }

    fn read_price(&self) -> Result<U256, EngineError> {
        let price = self.oracle.get_price()?;
        if price.is_zero() {
            return Err(EngineError::InvalidPrice);
        }
        Ok(price)
    }

    fn owed_at(&self, account: &Address, rate_index: U256) -> Result<U256, EngineError> {
        match self.ledger.borrow(account) {
            Some(record) => record.current_owed(rate_index),
            None => Ok(U256::ZERO),
        }
    }

    /// Asset of the account's posted collateral, or the pool's current one
    fn posted_collateral_asset(&self, account: &Address) -> Address {
        self.ledger
            .collateral(account)
            .map_or(self.pool.collateral_asset, |record| record.asset)
    }
}

/// Removes a closed position's debt from `total_borrows`.
///
/// Per-account interest and pool accrual round differently, so the last
/// borrowers out can owe slightly more than the aggregate holds. The excess
/// is absorbed at zero.
fn release_borrows(total_borrows: U256, owed: U256) -> U256 {
    if owed > total_borrows {
        warn!(
            %total_borrows,
            %owed,
            drift = %(owed - total_borrows),
            "repaid debt exceeds total borrows, absorbing accrual drift"
        );
    }
    zero_floor_sub(total_borrows, owed)
}
