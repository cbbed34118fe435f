//! Configuration for the sale engine

use region_core::BlockNumber;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sale engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Leadin curve configuration
    pub leadin: LeadinConfig,

    /// Block timing of the coretime chain
    pub timing: TimingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "sale-engine".to_string(),
            leadin: LeadinConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

/// Leadin curve configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeadinConfig {
    /// Price multiple of the floor price at the start of the leadin
    pub start_multiple: Decimal,
}

impl Default for LeadinConfig {
    fn default() -> Self {
        Self {
            start_multiple: Decimal::TWO,
        }
    }
}

/// Block timing of the coretime chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Coretime-chain blocks per timeslice
    pub blocks_per_timeslice: BlockNumber,

    /// Coretime-chain block time (milliseconds)
    pub block_time_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            blocks_per_timeslice: 40, // 80 relay blocks at half the relay block rate
            block_time_ms: 12_000,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(multiple) = std::env::var("SALE_LEADIN_START_MULTIPLE") {
            config.leadin.start_multiple = multiple.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid SALE_LEADIN_START_MULTIPLE: {}", e))
            })?;
        }

        if let Ok(blocks) = std::env::var("SALE_BLOCKS_PER_TIMESLICE") {
            config.timing.blocks_per_timeslice = blocks.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid SALE_BLOCKS_PER_TIMESLICE: {}", e))
            })?;
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service_name, "sale-engine");
        assert_eq!(config.leadin.start_multiple, Decimal::TWO);
        assert_eq!(config.timing.blocks_per_timeslice, 40);
    }

    #[test]
    fn test_parse_toml() {
        let config: Config = toml::from_str(
            r#"
            service_name = "sale-engine"

            [leadin]
            start_multiple = "100"

            [timing]
            blocks_per_timeslice = 80
            block_time_ms = 6000
            "#,
        )
        .unwrap();
        assert_eq!(config.leadin.start_multiple, Decimal::from(100));
        assert_eq!(config.timing.block_time_ms, 6_000);
    }
}
