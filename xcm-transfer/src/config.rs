//! Configuration for transfer message construction

use crate::message::{Weight, WeightLimit, XcmVersion};
use region_core::Balance;
use serde::{Deserialize, Serialize};

/// Transfer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferConfig {
    /// Parachain identifiers
    pub chains: ChainsConfig,

    /// Fees and execution limits
    pub execution: ExecutionConfig,

    /// Message version to emit
    #[serde(default)]
    pub xcm_version: XcmVersion,
}

/// Parachain identifiers and pallet indices
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainsConfig {
    /// Coretime chain para id
    pub coretime_para_id: u32,

    /// Market chain para id
    pub market_para_id: u32,

    /// Runtime index of the broker pallet on the Coretime chain
    pub broker_pallet_index: u8,
}

impl Default for ChainsConfig {
    fn default() -> Self {
        Self {
            coretime_para_id: 1005,
            market_para_id: 2000,
            broker_pallet_index: 50,
        }
    }
}

/// Fees and execution limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Relay-token amount attached to region transfers to pay for execution
    pub region_transfer_fee: Balance,

    /// Weight limit; `None` means unlimited
    pub weight_limit: Option<Weight>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            region_transfer_fee: 10_000_000_000, // 0.01 of a 12-decimal token
            weight_limit: None,
        }
    }
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self {
            chains: ChainsConfig::default(),
            execution: ExecutionConfig::default(),
            xcm_version: XcmVersion::default(),
        }
    }
}

impl TransferConfig {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TransferConfig = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = TransferConfig::default();

        if let Ok(id) = std::env::var("XCM_CORETIME_PARA_ID") {
            config.chains.coretime_para_id = id
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid XCM_CORETIME_PARA_ID: {}", e)))?;
        }

        if let Ok(id) = std::env::var("XCM_MARKET_PARA_ID") {
            config.chains.market_para_id = id
                .parse()
                .map_err(|e| crate::Error::Config(format!("Invalid XCM_MARKET_PARA_ID: {}", e)))?;
        }

        if let Ok(fee) = std::env::var("XCM_REGION_TRANSFER_FEE") {
            config.execution.region_transfer_fee = fee.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid XCM_REGION_TRANSFER_FEE: {}", e))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency
    pub fn validate(&self) -> crate::Result<()> {
        if self.chains.coretime_para_id == self.chains.market_para_id {
            return Err(crate::Error::Config(format!(
                "coretime and market chains share para id {}",
                self.chains.coretime_para_id
            )));
        }
        if self.execution.region_transfer_fee == 0 {
            return Err(crate::Error::Config(
                "region transfer fee must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Weight limit to attach to messages
    pub fn weight_limit(&self) -> WeightLimit {
        match self.execution.weight_limit {
            Some(weight) => WeightLimit::Limited(weight),
            None => WeightLimit::Unlimited,
        }
    }
}
