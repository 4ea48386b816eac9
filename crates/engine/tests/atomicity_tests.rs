//! Failed operations must leave the pool, the ledger and all balances untouched.

mod helpers;

use alloy_primitives::U256;
use helpers::{create_pool, snapshot, ALICE, BOB, CAROL, LIQUIDATOR, START};
use lendpool_engine::{EngineError, OracleError, TransferError, SECONDS_PER_YEAR};

#[test]
fn test_failed_deposit_transfer() {
    let mut pool = create_pool();
    pool.deposit(ALICE, U256::from(1_000)).unwrap();
    pool.clock_mut().advance(3_600);
    let before = snapshot(&pool);

    pool.transfers_mut().fail_after(0);
    let result = pool.deposit(ALICE, U256::from(500));

    assert!(matches!(
        result,
        Err(EngineError::Transfer(TransferError::Rejected(_)))
    ));
    assert_eq!(snapshot(&pool), before);
}

#[test]
fn test_deposit_without_funds() {
    let mut pool = create_pool();
    let before = snapshot(&pool);

    let result = pool.deposit(ALICE, U256::from(2_000_000));

    assert!(matches!(
        result,
        Err(EngineError::Transfer(TransferError::InsufficientFunds { .. }))
    ));
    assert_eq!(snapshot(&pool), before);
    // The first accrual was not committed either
    assert_eq!(pool.pool().last_accrual_time, None);
}

#[test]
fn test_failed_withdraw_transfer() {
    let mut pool = create_pool();
    pool.deposit(ALICE, U256::from(1_000)).unwrap();
    let before = snapshot(&pool);

    pool.transfers_mut().fail_after(0);
    assert!(pool.withdraw(ALICE, U256::from(1_000)).is_err());

    assert_eq!(snapshot(&pool), before);
    assert!(pool.deposit_of(&ALICE).is_some());
}

#[test]
fn test_borrow_second_leg_failure_returns_collateral() {
    let mut pool = create_pool();
    pool.deposit(ALICE, U256::from(10_000)).unwrap();
    let before = snapshot(&pool);

    // Collateral leg succeeds, disbursement leg fails
    pool.transfers_mut().fail_after(1);
    let result = pool.borrow(BOB, U256::from(10), U256::from(500));

    assert!(matches!(result, Err(EngineError::Transfer(_))));
    assert_eq!(snapshot(&pool), before);
    assert!(pool.borrow_of(&BOB).is_none());
    assert!(pool.collateral_of(&BOB).is_none());
}

#[test]
fn test_borrow_without_collateral_funds() {
    let mut pool = create_pool();
    pool.deposit(ALICE, U256::from(10_000)).unwrap();
    let before = snapshot(&pool);

    // Bob only holds 10_000 collateral units
    let result = pool.borrow(BOB, U256::from(10_001), U256::from(100));

    assert!(matches!(
        result,
        Err(EngineError::Transfer(TransferError::InsufficientFunds { .. }))
    ));
    assert_eq!(snapshot(&pool), before);
}

#[test]
fn test_borrow_oracle_unavailable() {
    let mut pool = create_pool();
    pool.deposit(ALICE, U256::from(10_000)).unwrap();
    pool.clock_mut().advance(60);
    let before = snapshot(&pool);

    pool.oracle_mut().set_unavailable("feed offline");
    let result = pool.borrow(BOB, U256::from(10), U256::from(100));

    assert!(matches!(
        result,
        Err(EngineError::Oracle(OracleError::Unavailable(_)))
    ));
    assert_eq!(snapshot(&pool), before);
}

#[test]
fn test_failed_repay_keeps_position() {
    let mut pool = create_pool();
    pool.deposit(ALICE, U256::from(10_000)).unwrap();
    pool.borrow(BOB, U256::from(10), U256::from(500)).unwrap();
    pool.clock_mut().advance(SECONDS_PER_YEAR);
    let before = snapshot(&pool);

    // Debt leg succeeds, collateral leg fails
    pool.transfers_mut().fail_after(1);
    assert!(pool.repay(BOB).is_err());

    assert_eq!(snapshot(&pool), before);
    assert!(pool.borrow_of(&BOB).is_some());
    assert_eq!(pool.pool().last_accrual_time, Some(START));
}

#[test]
fn test_failed_liquidation_keeps_position() {
    let mut pool = create_pool();
    pool.deposit(ALICE, U256::from(10_000)).unwrap();
    pool.borrow(BOB, U256::from(10), U256::from(700)).unwrap();
    pool.oracle_mut().set_price(U256::from(50));
    let before = snapshot(&pool);

    pool.transfers_mut().fail_after(1);
    assert!(pool.liquidate(LIQUIDATOR, BOB).is_err());
    assert_eq!(snapshot(&pool), before);

    // Nothing was consumed; the same liquidation succeeds afterwards
    assert!(pool.liquidate(LIQUIDATOR, BOB).is_ok());
}

#[test]
fn test_liquidator_without_funds() {
    let mut pool = create_pool();
    pool.deposit(ALICE, U256::from(10_000)).unwrap();
    pool.borrow(BOB, U256::from(10), U256::from(700)).unwrap();
    pool.oracle_mut().set_price(U256::from(50));

    // Carol parks her whole base balance in the pool and cannot pay
    let carol_funds = helpers::base_balance(&pool, CAROL);
    pool.deposit(CAROL, carol_funds).unwrap();
    let before = snapshot(&pool);

    let result = pool.liquidate(CAROL, BOB);
    assert!(matches!(
        result,
        Err(EngineError::Transfer(TransferError::InsufficientFunds { .. }))
    ));
    assert_eq!(snapshot(&pool), before);
}

#[test]
fn test_rejected_operations_do_not_accrue() {
    let mut pool = create_pool();
    pool.deposit(ALICE, U256::from(10_000)).unwrap();
    pool.borrow(BOB, U256::from(10), U256::from(700)).unwrap();
    pool.clock_mut().advance(SECONDS_PER_YEAR);
    let before = snapshot(&pool);

    assert!(pool.borrow(BOB, U256::ZERO, U256::from(1)).is_err());
    assert!(pool.liquidate(LIQUIDATOR, BOB).is_err());
    assert!(pool.withdraw(ALICE, U256::from(10_001)).is_err());

    assert_eq!(snapshot(&pool), before);
}
