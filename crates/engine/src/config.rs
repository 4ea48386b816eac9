//! Pool configuration loaded from TOML.
//!
//! ```toml
//! admin = "0x00000000000000000000000000000000000000aa"
//! pool_account = "0x00000000000000000000000000000000000000ff"
//! base_asset = "0x00000000000000000000000000000000000000b0"
//! collateral_asset = "0x00000000000000000000000000000000000000c0"
//! single_deposit_slot = false
//!
//! [risk]
//! ltv_bps = 7000
//! interest_rate_bps_per_year = 1000
//! liquidation_threshold_bps = 8000
//! liquidation_penalty_bps = 500
//! ```

use std::path::Path;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, EngineError};
use crate::pool::{PoolState, RiskParameters};

/// Everything needed to initialize a pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Identity allowed to run admin operations
    pub admin: Address,
    /// Custody account for pool holdings
    pub pool_account: Address,
    /// Asset lent and deposited
    pub base_asset: Address,
    /// Asset posted as collateral
    pub collateral_asset: Address,
    /// Start paused
    #[serde(default)]
    pub paused: bool,
    /// Reject top-up deposits while an account still holds a balance
    #[serde(default)]
    pub single_deposit_slot: bool,
    /// Initial risk parameters
    pub risk: RiskParameters,
}

impl PoolConfig {
    /// Parses and validates a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: PoolConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    /// Checks risk parameters against their bounds
    pub fn validate(&self) -> Result<(), EngineError> {
        self.risk.validate()
    }

    /// Builds the initial, empty pool state
    pub fn initial_state(&self) -> PoolState {
        let mut pool = PoolState::new(
            self.admin,
            self.pool_account,
            self.base_asset,
            self.collateral_asset,
            self.risk,
        );
        pool.paused = self.paused;
        pool.single_deposit_slot = self.single_deposit_slot;
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"
admin = "0x00000000000000000000000000000000000000aa"
pool_account = "0x00000000000000000000000000000000000000ff"
base_asset = "0x00000000000000000000000000000000000000b0"
collateral_asset = "0x00000000000000000000000000000000000000c0"

[risk]
ltv_bps = 7000
interest_rate_bps_per_year = 1000
liquidation_threshold_bps = 8000
liquidation_penalty_bps = 500
"#;

    #[test]
    fn test_parse_valid_config() {
        let config = PoolConfig::from_toml_str(VALID).unwrap();
        assert_eq!(config.admin, Address::with_last_byte(0xaa));
        assert_eq!(config.pool_account, Address::with_last_byte(0xff));
        assert_eq!(config.risk.ltv_bps, 7_000);
        assert!(!config.paused);
        assert!(!config.single_deposit_slot);
    }

    #[test]
    fn test_initial_state() {
        let mut config = PoolConfig::from_toml_str(VALID).unwrap();
        config.paused = true;
        config.single_deposit_slot = true;

        let pool = config.initial_state();
        assert!(pool.paused);
        assert!(pool.single_deposit_slot);
        assert_eq!(pool.collateral_asset, Address::with_last_byte(0xc0));
        assert_eq!(pool.last_accrual_time, None);
    }

    #[test]
    fn test_out_of_bounds_config() {
        let input = VALID.replace("ltv_bps = 7000", "ltv_bps = 9500");
        let result = PoolConfig::from_toml_str(&input);
        assert!(matches!(
            result,
            Err(ConfigError::Invalid(EngineError::InvalidParameter { name: "ltv_bps", .. }))
        ));
    }

    #[test]
    fn test_missing_field() {
        let input = VALID.replace("liquidation_penalty_bps = 500", "");
        assert!(matches!(
            PoolConfig::from_toml_str(&input),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let result = PoolConfig::load("/nonexistent/lendpool/pool.toml");
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = PoolConfig::from_toml_str(VALID).unwrap();
        let encoded = toml::to_string(&config).unwrap();
        assert_eq!(PoolConfig::from_toml_str(&encoded).unwrap(), config);
    }
}
