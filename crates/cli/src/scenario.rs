//! Scenario files: a pool, starting balances and a list of steps.
//!
//! Accounts and assets are written as labels (`"alice"`, `"usdc"`) or as hex
//! addresses. A label maps to the address made of the last 20 bytes of its
//! keccak256 hash, so the same label always names the same account.
//!
//! ```toml
//! start_time = 1700000000
//! price = 100
//!
//! [pool]
//! admin = "admin"
//! base_asset = "usdc"
//! collateral_asset = "weth"
//! risk = { ltv_bps = 7000, interest_rate_bps_per_year = 1000, liquidation_threshold_bps = 8000, liquidation_penalty_bps = 500 }
//!
//! [[balances]]
//! account = "alice"
//! base = 100000
//!
//! [[steps]]
//! action = "deposit"
//! account = "alice"
//! amount = 10000
//! ```

use std::path::Path;

use alloy_primitives::{keccak256, Address};
use anyhow::{Context, Result};
use lendpool_engine::{PoolConfig, RiskParameters};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    /// Clock reading before the first step
    #[serde(default)]
    pub start_time: u64,
    /// Initial oracle price, base units per collateral unit
    pub price: u64,
    pub pool: ScenarioPool,
    #[serde(default)]
    pub balances: Vec<Balance>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Pool section of a scenario, with labels in place of addresses
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioPool {
    pub admin: String,
    #[serde(default = "default_pool_account")]
    pub pool_account: String,
    pub base_asset: String,
    pub collateral_asset: String,
    #[serde(default)]
    pub paused: bool,
    #[serde(default)]
    pub single_deposit_slot: bool,
    pub risk: RiskParameters,
}

fn default_pool_account() -> String {
    "pool".to_string()
}

/// Starting wallet balances of one account
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Balance {
    pub account: String,
    #[serde(default)]
    pub base: u64,
    #[serde(default)]
    pub collateral: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Deposit {
        account: String,
        amount: u64,
    },
    Withdraw {
        account: String,
        amount: u64,
    },
    Borrow {
        account: String,
        #[serde(default)]
        collateral: u64,
        amount: u64,
    },
    Repay {
        account: String,
    },
    Liquidate {
        liquidator: String,
        target: String,
    },
    SetPrice {
        price: u64,
    },
    AdvanceTime {
        seconds: u64,
    },
    SetPaused {
        caller: String,
        paused: bool,
    },
    SetRisk {
        caller: String,
        risk: RiskParameters,
    },
}

impl Step {
    pub fn action(&self) -> &'static str {
        match self {
            Step::Deposit { .. } => "deposit",
            Step::Withdraw { .. } => "withdraw",
            Step::Borrow { .. } => "borrow",
            Step::Repay { .. } => "repay",
            Step::Liquidate { .. } => "liquidate",
            Step::SetPrice { .. } => "set_price",
            Step::AdvanceTime { .. } => "advance_time",
            Step::SetPaused { .. } => "set_paused",
            Step::SetRisk { .. } => "set_risk",
        }
    }

    /// Account labels the step refers to, in order
    pub fn accounts(&self) -> Vec<&str> {
        match self {
            Step::Deposit { account, .. }
            | Step::Withdraw { account, .. }
            | Step::Borrow { account, .. }
            | Step::Repay { account } => vec![account.as_str()],
            Step::Liquidate { liquidator, target } => vec![liquidator.as_str(), target.as_str()],
            Step::SetPrice { .. }
            | Step::AdvanceTime { .. }
            | Step::SetPaused { .. }
            | Step::SetRisk { .. } => Vec::new(),
        }
    }
}

impl Scenario {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        toml::from_str(input).context("Invalid scenario")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let input = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario: {}", path.display()))?;
        Self::from_toml_str(&input)
            .with_context(|| format!("Failed to load scenario: {}", path.display()))
    }

    /// Resolves the pool section into an engine config
    pub fn pool_config(&self) -> Result<PoolConfig> {
        let pool = &self.pool;
        Ok(PoolConfig {
            admin: resolve(&pool.admin)?,
            pool_account: resolve(&pool.pool_account)?,
            base_asset: resolve(&pool.base_asset)?,
            collateral_asset: resolve(&pool.collateral_asset)?,
            paused: pool.paused,
            single_deposit_slot: pool.single_deposit_slot,
            risk: pool.risk,
        })
    }

    /// Every account label used by balances and steps, first mention first
    pub fn account_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = Vec::new();
        let mentioned = self
            .balances
            .iter()
            .map(|b| b.account.as_str())
            .chain(self.steps.iter().flat_map(Step::accounts));
        for label in mentioned {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
        labels
    }
}

/// Maps a label or hex address to an address.
pub fn resolve(label: &str) -> Result<Address> {
    let label = label.trim();
    if label.is_empty() {
        anyhow::bail!("Empty account label");
    }
    if label.starts_with("0x") {
        return label
            .parse()
            .with_context(|| format!("Invalid address: {}", label));
    }
    Ok(Address::from_word(keccak256(label.as_bytes())))
}
