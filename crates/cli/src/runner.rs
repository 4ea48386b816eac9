//! Executes a scenario against an in-memory pool.

use alloy_primitives::U256;
use anyhow::{Context, Result};
use lendpool_engine::{
    AccountPosition, AssetTransferService, Clock, EngineError, FixedPriceOracle, InMemoryAssets,
    LendingPool, ManualClock, PoolState,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::scenario::{resolve, Scenario, Step};

type ScenarioPool = LendingPool<InMemoryAssets, FixedPriceOracle, ManualClock>;

/// Result of one scenario step
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    /// 1-based position in the scenario
    pub index: usize,
    pub action: &'static str,
    pub ok: bool,
    /// What happened, or why the step was rejected
    pub detail: String,
    /// Clock reading when the step ran
    pub time: u64,
}

/// Position of a labelled account at the end of the run
#[derive(Debug, Clone, Serialize)]
pub struct LabeledPosition {
    pub label: String,
    #[serde(flatten)]
    pub position: AccountPosition,
    /// Base asset left in the account's wallet
    pub wallet_base: U256,
    /// Collateral asset left in the account's wallet
    pub wallet_collateral: U256,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub steps: Vec<StepOutcome>,
    pub pool: PoolState,
    /// Base asset held by the pool account
    pub pool_liquidity: U256,
    pub price: U256,
    pub positions: Vec<LabeledPosition>,
}

impl RunReport {
    /// First rejected step, if any
    pub fn first_failure(&self) -> Option<&StepOutcome> {
        self.steps.iter().find(|s| !s.ok)
    }
}

/// Runs every step in order. With `fail_fast`, stops after the first rejection.
pub fn execute(scenario: &Scenario, fail_fast: bool) -> Result<RunReport> {
    let config = scenario.pool_config()?;
    let (base_asset, collateral_asset) = (config.base_asset, config.collateral_asset);

    let mut assets = InMemoryAssets::new();
    for balance in &scenario.balances {
        let account = resolve(&balance.account)?;
        assets.mint(base_asset, account, U256::from(balance.base));
        assets.mint(collateral_asset, account, U256::from(balance.collateral));
    }

    let mut pool = LendingPool::new(
        config,
        assets,
        FixedPriceOracle::new(U256::from(scenario.price)),
        ManualClock::new(scenario.start_time),
    )
    .context("Invalid pool section")?;

    let mut price = U256::from(scenario.price);
    let mut steps = Vec::with_capacity(scenario.steps.len());
    for (i, step) in scenario.steps.iter().enumerate() {
        let time = current_time(&pool);
        let outcome = match apply(&mut pool, step, &mut price)? {
            Ok(detail) => StepOutcome {
                index: i + 1,
                action: step.action(),
                ok: true,
                detail,
                time,
            },
            Err(err) => {
                debug!(step = i + 1, action = step.action(), error = %err, "step rejected");
                StepOutcome {
                    index: i + 1,
                    action: step.action(),
                    ok: false,
                    detail: err.to_string(),
                    time,
                }
            }
        };
        let failed = !outcome.ok;
        steps.push(outcome);
        if failed && fail_fast {
            break;
        }
    }

    let mut positions = Vec::new();
    for label in scenario.account_labels() {
        let account = resolve(label)?;
        match pool.position(&account) {
            Ok(position) => positions.push(LabeledPosition {
                label: label.to_string(),
                position,
                wallet_base: pool.transfers().balance_of(base_asset, account),
                wallet_collateral: pool.transfers().balance_of(collateral_asset, account),
            }),
            Err(err) => warn!(label, error = %err, "position unavailable"),
        }
    }

    let pool_state = pool.pool().clone();
    Ok(RunReport {
        steps,
        pool_liquidity: pool.available_liquidity(),
        pool: pool_state,
        price,
        positions,
    })
}

/// Applies one step. The outer error is a broken scenario (bad label); the
/// inner one is the engine rejecting the step.
fn apply(
    pool: &mut ScenarioPool,
    step: &Step,
    price: &mut U256,
) -> Result<Result<String, EngineError>> {
    let outcome = match step {
        Step::Deposit { account, amount } => pool
            .deposit(resolve(account)?, U256::from(*amount))
            .map(|()| format!("{} deposited {}", account, amount)),
        Step::Withdraw { account, amount } => pool
            .withdraw(resolve(account)?, U256::from(*amount))
            .map(|w| {
                format!(
                    "{} withdrew {} plus {} yield",
                    account, w.amount, w.yield_paid
                )
            }),
        Step::Borrow {
            account,
            collateral,
            amount,
        } => pool
            .borrow(
                resolve(account)?,
                U256::from(*collateral),
                U256::from(*amount),
            )
            .map(|()| {
                format!(
                    "{} borrowed {} posting {} collateral",
                    account, amount, collateral
                )
            }),
        Step::Repay { account } => pool.repay(resolve(account)?).map(|r| {
            format!(
                "{} repaid {} and got back {} collateral",
                account, r.repaid, r.collateral_returned
            )
        }),
        Step::Liquidate { liquidator, target } => pool
            .liquidate(resolve(liquidator)?, resolve(target)?)
            .map(|l| {
                format!(
                    "{} cleared {} of {}'s debt for {}, seized {} collateral",
                    liquidator, l.debt_cleared, target, l.repay_amount, l.collateral_seized
                )
            }),
        Step::SetPrice { price: new_price } => {
            *price = U256::from(*new_price);
            pool.oracle_mut().set_price(*price);
            Ok(format!("price set to {}", new_price))
        }
        Step::AdvanceTime { seconds } => {
            pool.clock_mut().advance(*seconds);
            Ok(format!(
                "clock advanced {}s to {}",
                seconds,
                current_time(pool)
            ))
        }
        Step::SetPaused { caller, paused } => pool
            .set_paused(resolve(caller)?, *paused)
            .map(|()| format!("paused = {}", paused)),
        Step::SetRisk { caller, risk } => pool
            .set_risk_parameters(resolve(caller)?, *risk)
            .map(|()| {
                format!(
                    "ltv {} / rate {} / threshold {} / penalty {} bps",
                    risk.ltv_bps,
                    risk.interest_rate_bps_per_year,
                    risk.liquidation_threshold_bps,
                    risk.liquidation_penalty_bps
                )
            }),
    };
    Ok(outcome)
}

fn current_time(pool: &ScenarioPool) -> u64 {
    pool.clock().now()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_scenario(steps: &str) -> Scenario {
        let input = format!(
            r#"
start_time = 1700000000
price = 100

[pool]
admin = "admin"
base_asset = "usdc"
collateral_asset = "weth"
risk = {{ ltv_bps = 7000, interest_rate_bps_per_year = 1000, liquidation_threshold_bps = 8000, liquidation_penalty_bps = 500 }}

[[balances]]
account = "alice"
base = 100000

[[balances]]
account = "bob"
base = 10000
collateral = 100

{steps}
"#
        );
        Scenario::from_toml_str(&input).unwrap()
    }

    #[test]
    fn test_execute_deposit_and_borrow() {
        let scenario = create_test_scenario(
            r#"
[[steps]]
action = "deposit"
account = "alice"
amount = 10000

[[steps]]
action = "borrow"
account = "bob"
collateral = 10
amount = 700
"#,
        );

        let report = execute(&scenario, false).unwrap();

        assert!(report.steps.iter().all(|s| s.ok));
        assert_eq!(report.pool.total_deposits, U256::from(10_000));
        assert_eq!(report.pool.total_borrows, U256::from(700));
        assert_eq!(report.pool_liquidity, U256::from(9_300));

        let bob = &report.positions[1];
        assert_eq!(bob.label, "bob");
        assert_eq!(bob.position.debt, U256::from(700));
        assert_eq!(bob.wallet_base, U256::from(10_700));
        assert_eq!(bob.wallet_collateral, U256::from(90));
    }

    #[test]
    fn test_rejected_step_is_recorded() {
        let scenario = create_test_scenario(
            r#"
[[steps]]
action = "withdraw"
account = "alice"
amount = 1

[[steps]]
action = "deposit"
account = "alice"
amount = 500
"#,
        );

        let report = execute(&scenario, false).unwrap();

        assert_eq!(report.steps.len(), 2);
        assert!(!report.steps[0].ok);
        assert!(report.steps[0].detail.contains("No matching record"));
        assert!(report.steps[1].ok);
        assert_eq!(report.first_failure().unwrap().index, 1);
    }

    #[test]
    fn test_fail_fast_stops_at_first_rejection() {
        let scenario = create_test_scenario(
            r#"
[[steps]]
action = "set_paused"
caller = "bob"
paused = true

[[steps]]
action = "deposit"
account = "alice"
amount = 500
"#,
        );

        let report = execute(&scenario, true).unwrap();

        assert_eq!(report.steps.len(), 1);
        assert!(!report.steps[0].ok);
        assert_eq!(report.pool.total_deposits, U256::ZERO);
    }

    #[test]
    fn test_price_and_time_steps() {
        let scenario = create_test_scenario(
            r#"
[[steps]]
action = "set_price"
price = 42

[[steps]]
action = "advance_time"
seconds = 60
"#,
        );

        let report = execute(&scenario, false).unwrap();

        assert_eq!(report.price, U256::from(42));
        assert_eq!(report.steps[1].time, 1_700_000_000);
        assert!(report.steps[1].detail.contains("1700000060"));
    }

    #[test]
    fn test_invalid_pool_section() {
        let mut scenario = create_test_scenario("");
        scenario.pool.risk.ltv_bps = 9_500;
        assert!(execute(&scenario, false).is_err());
    }
}
