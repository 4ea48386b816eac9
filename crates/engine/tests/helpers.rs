//! Test helper utilities for engine integration tests.

#![allow(dead_code)]

use alloy_primitives::{Address, U256};
use lendpool_engine::{
    AccountLedger, AssetTransferService, FixedPriceOracle, InMemoryAssets, LendingPool,
    ManualClock, PoolConfig, PoolState, RiskParameters,
};

pub const ADMIN: Address = Address::with_last_byte(0xaa);
pub const POOL: Address = Address::with_last_byte(0xff);
pub const BASE: Address = Address::with_last_byte(0xb0);
pub const COLLATERAL: Address = Address::with_last_byte(0xc0);
pub const ALICE: Address = Address::with_last_byte(1);
pub const BOB: Address = Address::with_last_byte(2);
pub const CAROL: Address = Address::with_last_byte(3);
pub const LIQUIDATOR: Address = Address::with_last_byte(4);
pub const ACCOUNTS: [Address; 4] = [ALICE, BOB, CAROL, LIQUIDATOR];
pub const START: u64 = 1_700_000_000;

pub type TestPool = LendingPool<InMemoryAssets, FixedPriceOracle, ManualClock>;

/// Risk parameters used unless a test overrides them.
pub fn default_risk() -> RiskParameters {
    RiskParameters {
        ltv_bps: 7_000,
        interest_rate_bps_per_year: 1_000,
        liquidation_threshold_bps: 8_000,
        liquidation_penalty_bps: 500,
    }
}

pub fn test_config(risk: RiskParameters) -> PoolConfig {
    PoolConfig {
        admin: ADMIN,
        pool_account: POOL,
        base_asset: BASE,
        collateral_asset: COLLATERAL,
        paused: false,
        single_deposit_slot: false,
        risk,
    }
}

/// Pool at price 100 where every test account holds 1M base and 10K collateral.
pub fn create_pool_with(risk: RiskParameters) -> TestPool {
    let mut assets = InMemoryAssets::new();
    for account in ACCOUNTS {
        assets.mint(BASE, account, U256::from(1_000_000));
        assets.mint(COLLATERAL, account, U256::from(10_000));
    }
    LendingPool::new(
        test_config(risk),
        assets,
        FixedPriceOracle::new(U256::from(100)),
        ManualClock::new(START),
    )
    .unwrap()
}

pub fn create_pool() -> TestPool {
    create_pool_with(default_risk())
}

pub fn base_balance(pool: &TestPool, account: Address) -> U256 {
    pool.transfers().balance_of(BASE, account)
}

pub fn collateral_balance(pool: &TestPool, account: Address) -> U256 {
    pool.transfers().balance_of(COLLATERAL, account)
}

/// Everything an operation could change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub pool: PoolState,
    pub ledger: AccountLedger,
    pub balances: Vec<(U256, U256)>,
}

pub fn snapshot(pool: &TestPool) -> Snapshot {
    let balances = ACCOUNTS
        .iter()
        .chain(std::iter::once(&POOL))
        .map(|account| (base_balance(pool, *account), collateral_balance(pool, *account)))
        .collect();
    Snapshot {
        pool: pool.pool().clone(),
        ledger: pool.ledger().clone(),
        balances,
    }
}

/// Asserts the exact aggregate invariants: deposit and collateral sums, and
/// that borrow and collateral records only exist in pairs.
pub fn assert_ledger_sums(pool: &TestPool) {
    let ledger = pool.ledger();
    assert_eq!(ledger.sum_deposits(), pool.pool().total_deposits);
    assert_eq!(ledger.sum_collateral(), pool.pool().total_collateral);

    assert!(ledger.deposits().all(|(_, record)| !record.amount.is_zero()));
    let borrowers: Vec<_> = ledger.borrows().map(|(account, _)| *account).collect();
    let posters: Vec<_> = ledger.collaterals().map(|(account, _)| *account).collect();
    assert_eq!(borrowers, posters);
}
