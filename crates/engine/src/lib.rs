//! Lending Pool Accounting Engine
//!
//! This crate implements the accounting core of a collateralized lending pool:
//! depositors supply a base asset and earn yield, borrowers post a collateral
//! asset and borrow the base asset up to a loan-to-value limit, and positions
//! past the liquidation threshold can be closed by any third party.
//!
//! # Overview
//!
//! - [`PoolState`] holds the pool-wide aggregates, the yield index and the
//!   risk parameters
//! - [`AccountLedger`] holds per-account deposit, borrow and collateral records
//! - [`PoolState::accrue_global`] capitalizes borrower interest and streams it to
//!   depositors through a yield index, without iterating accounts
//! - [`borrow_limit`] admits borrows against `collateral * price * ltv`
//! - [`liquidation`] decides when a position can be liquidated and what the
//!   liquidator pays
//! - [`LendingPool`] ties these together behind the deposit, withdraw, borrow,
//!   repay, liquidate and admin entry points
//!
//! Asset movements, prices and time come from the [`AssetTransferService`],
//! [`PriceOracle`] and [`Clock`] collaborators. In-memory versions of all three
//! are included for tests and simulations.

pub mod accrual;
pub mod borrow_limit;
pub mod collaborators;
pub mod config;
pub mod engine;
pub mod error;
pub mod ledger;
pub mod liquidation;
pub mod math;
pub mod pool;
pub mod position;

// Re-export commonly used types
pub use error::{ConfigError, EngineError, OracleError, TransferError};

pub use accrual::{calculate_account_interest, get_accrued_interest, AccruedInterest};
pub use collaborators::{
    AssetTransferService, Clock, FixedPriceOracle, InMemoryAssets, ManualClock, PriceOracle,
    TransferLeg,
};
pub use config::PoolConfig;
pub use engine::{LendingPool, Liquidation, Repayment, Withdrawal};
pub use ledger::{AccountLedger, BorrowRecord, CollateralRecord, DepositRecord};
pub use math::{BPS_SCALE, PERCENT_SCALE, SECONDS_PER_YEAR};
pub use pool::{
    PoolState, RiskParameters, MAX_INTEREST_RATE_BPS, MAX_LIQUIDATION_PENALTY_BPS,
    MAX_LIQUIDATION_THRESHOLD_BPS, MAX_LTV_BPS,
};
pub use position::AccountPosition;
