//! Ledger configuration

use serde::Deserialize;
use thiserror::Error;

use std::fs;
use std::path::Path;

/// Errors that can occur while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Tunables for a ledger
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LedgerConfig {
    /// Leading zero hex digits required in a block hash
    #[serde(default = "default_difficulty")]
    pub difficulty: usize,

    /// Amount minted to the miner of each block
    #[serde(default = "default_mining_reward")]
    pub mining_reward: f64,

    /// Parallel workers used by the nonce search
    #[serde(default = "default_mining_workers")]
    pub mining_workers: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty: default_difficulty(),
            mining_reward: default_mining_reward(),
            mining_workers: default_mining_workers(),
        }
    }
}

fn default_difficulty() -> usize {
    2
}

fn default_mining_reward() -> f64 {
    100.0
}

fn default_mining_workers() -> usize {
    1
}

/// A SHA-256 hash has 64 hex digits; more leading zeros can never be met
pub const MAX_DIFFICULTY: usize = 64;

impl LedgerConfig {
    /// Parses and validates a TOML document
    pub fn from_toml(source: &str) -> Result<Self, ConfigError> {
        let config: LedgerConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        Self::from_toml(&fs::read_to_string(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.difficulty > MAX_DIFFICULTY {
            return Err(ConfigError::Invalid(format!(
                "difficulty {} exceeds {}",
                self.difficulty, MAX_DIFFICULTY
            )));
        }

        if !self.mining_reward.is_finite() || self.mining_reward <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "mining_reward must be a positive number, got {}",
                self.mining_reward
            )));
        }

        if self.mining_workers == 0 {
            return Err(ConfigError::Invalid("mining_workers must be at least 1".to_string()));
        }

        Ok(())
    }
}
