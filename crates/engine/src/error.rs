//! Error types for the lending engine.

use std::path::PathBuf;

use alloy_primitives::{Address, U256};
use thiserror::Error;

/// Errors returned by the lending pool entry points.
///
/// Every variant is returned before any ledger, aggregate or balance change is
/// committed, so a failed call leaves the pool exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Amount was zero
    #[error("Invalid amount: must be greater than zero")]
    InvalidAmount,

    /// The operation needs a record the account does not have
    #[error("No matching record for account {account}")]
    NotFound { account: Address },

    /// Withdrawal larger than the recorded deposit
    #[error("Insufficient balance for account {account}: requested {requested}, available {available}")]
    InsufficientBalance {
        account: Address,
        requested: U256,
        available: U256,
    },

    /// Pool holdings cannot fund the payout
    #[error("Insufficient pool liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity { requested: U256, available: U256 },

    /// Requested debt would exceed the LTV limit
    #[error("Borrow limit exceeded: requested total debt {requested}, max {max}")]
    BorrowLimitExceeded { requested: U256, max: U256 },

    /// Oracle returned zero
    #[error("Invalid oracle price: price must be greater than zero")]
    InvalidPrice,

    /// Position is missing or still healthy
    #[error("Position of account {account} cannot be liquidated")]
    CannotLiquidate { account: Address },

    /// Caller is not the admin
    #[error("Unauthorized: {caller} is not the pool admin")]
    Unauthorized { caller: Address },

    /// Pool is paused
    #[error("Pool is paused")]
    Paused,

    /// Risk parameter outside its allowed range
    #[error("Invalid parameter {name}: {value} exceeds maximum {max}")]
    InvalidParameter {
        name: &'static str,
        value: u32,
        max: u32,
    },

    /// Account already holds a deposit while single-slot deposits are enforced
    #[error("Account {account} already has an active deposit")]
    DepositSlotOccupied { account: Address },

    /// New collateral offered in a different asset than the account's open position
    #[error("Account {account} holds collateral in {posted}, cannot add {current}")]
    CollateralAssetMismatch {
        account: Address,
        posted: Address,
        current: Address,
    },

    /// Clock reading went backwards
    #[error("Invalid timestamp: now {now} is before last accrual {last_accrual}")]
    InvalidTimestamp { now: u64, last_accrual: u64 },

    /// Internal arithmetic invariant broken (overflow or underflow)
    #[error("Arithmetic overflow")]
    ArithmeticOverflow,

    /// Asset transfer collaborator failed
    #[error("Asset transfer failed: {0}")]
    Transfer(#[from] TransferError),

    /// Price oracle collaborator failed
    #[error("Price oracle failed: {0}")]
    Oracle(#[from] OracleError),
}

/// Errors reported by an [`crate::AssetTransferService`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// Sender does not hold enough of the asset
    #[error("Insufficient funds for {holder} in asset {asset}: requested {requested}, available {available}")]
    InsufficientFunds {
        holder: Address,
        asset: Address,
        requested: U256,
        available: U256,
    },

    /// Transfer refused by the service
    #[error("Transfer rejected: {0}")]
    Rejected(String),
}

/// Errors reported by a [`crate::PriceOracle`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OracleError {
    /// No price could be read
    #[error("Oracle unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised while loading a [`crate::PoolConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Config file is not valid TOML for a pool config
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config parsed but holds out-of-range values
    #[error("Invalid config: {0}")]
    Invalid(#[from] EngineError),
}
