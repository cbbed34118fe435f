//! Configuration for chain synchronization

use serde::{Deserialize, Serialize};
use std::time::Duration;
use xcm_transfer::TransferConfig;

/// Synchronization configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Poll loop and retry settings
    pub polling: PollingConfig,

    /// Region timing on the relay chain
    pub timing: TimingConfig,

    /// Transfer message settings
    #[serde(default)]
    pub transfer: TransferConfig,

    /// Sale engine settings
    #[serde(default)]
    pub sale: sale_engine::Config,
}

/// Poll loop and retry settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollingConfig {
    /// Interval between retrieval poll passes (milliseconds)
    pub interval_ms: u64,

    /// First delay between destination visibility checks (milliseconds)
    pub initial_backoff_ms: u64,

    /// Largest delay between visibility checks (milliseconds)
    pub max_backoff_ms: u64,

    /// Visibility checks before giving up with a timeout
    pub max_attempts: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: 5_000,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
            max_attempts: 10,
        }
    }
}

impl PollingConfig {
    /// Poll interval
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// First backoff delay
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    /// Largest backoff delay
    pub fn max_backoff(&self) -> Duration {
        Duration::from_millis(self.max_backoff_ms)
    }
}

/// Region timing on the relay chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Relay blocks per timeslice
    pub timeslice_period: u32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            timeslice_period: region_core::DEFAULT_TIMESLICE_PERIOD,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "coretime-sync".to_string(),
            polling: PollingConfig::default(),
            timing: TimingConfig::default(),
            transfer: TransferConfig::default(),
            sale: sale_engine::Config::default(),
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load from environment variables
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(interval) = std::env::var("SYNC_POLL_INTERVAL_MS") {
            config.polling.interval_ms = interval.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid SYNC_POLL_INTERVAL_MS: {}", e))
            })?;
        }

        if let Ok(attempts) = std::env::var("SYNC_MAX_POLL_ATTEMPTS") {
            config.polling.max_attempts = attempts.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid SYNC_MAX_POLL_ATTEMPTS: {}", e))
            })?;
        }

        if let Ok(period) = std::env::var("SYNC_TIMESLICE_PERIOD") {
            config.timing.timeslice_period = period.parse().map_err(|e| {
                crate::Error::Config(format!("Invalid SYNC_TIMESLICE_PERIOD: {}", e))
            })?;
        }

        config.transfer = TransferConfig::from_env()?;
        config.sale = sale_engine::Config::from_env()?;

        config.validate()?;
        Ok(config)
    }

    /// Check internal consistency
    pub fn validate(&self) -> crate::Result<()> {
        if self.polling.interval_ms == 0 {
            return Err(crate::Error::Config("poll interval must be positive".to_string()));
        }
        if self.polling.max_attempts == 0 {
            return Err(crate::Error::Config("max poll attempts must be positive".to_string()));
        }
        if self.polling.initial_backoff_ms > self.polling.max_backoff_ms {
            return Err(crate::Error::Config(format!(
                "initial backoff {}ms exceeds max backoff {}ms",
                self.polling.initial_backoff_ms, self.polling.max_backoff_ms
            )));
        }
        if self.timing.timeslice_period == 0 {
            return Err(crate::Error::Config("timeslice period must be positive".to_string()));
        }
        self.transfer.validate()?;
        Ok(())
    }
}
