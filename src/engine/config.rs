//! Engine and reseeding configuration.
//!
//! The ensemble composition and the reseed cadence are fixed at
//! construction; configuration errors are fatal and surface before any
//! generator state exists.

use crate::generators::Algorithm;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Configuration for an engine and its reseed schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Ordered ensemble composition. Duplicate tags are allowed and give
    /// additional independent state.
    #[serde(default = "default_algorithms")]
    pub algorithms: Vec<Algorithm>,
    /// Interval between reseed cycles, in seconds.
    #[serde(default = "default_interval_secs")]
    pub reseed_interval_secs: u64,
    /// Size of the folded seed buffer delivered to the engine each cycle.
    #[serde(default = "default_seed_size")]
    pub seed_size: usize,
    /// Wall-clock budget granted to each entropy source per cycle, in
    /// milliseconds. A source that overruns is treated as failed.
    #[serde(default = "default_source_budget_ms")]
    pub source_budget_ms: u64,
}

fn default_algorithms() -> Vec<Algorithm> {
    Algorithm::default_ensemble()
}

fn default_interval_secs() -> u64 {
    300
}

fn default_seed_size() -> usize {
    2048
}

fn default_source_budget_ms() -> u64 {
    10_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            algorithms: default_algorithms(),
            reseed_interval_secs: default_interval_secs(),
            seed_size: default_seed_size(),
            source_budget_ms: default_source_budget_ms(),
        }
    }
}

impl EngineConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.algorithms.is_empty() {
            return Err(ConfigError::EmptyEnsemble);
        }
        if self.reseed_interval_secs == 0 {
            return Err(ConfigError::InvalidInterval);
        }
        if self.seed_size == 0 {
            return Err(ConfigError::InvalidSeedSize);
        }
        Ok(())
    }

    /// Reseed interval as a [`Duration`].
    pub fn reseed_interval(&self) -> Duration {
        Duration::from_secs(self.reseed_interval_secs)
    }

    /// Per-source fetch budget as a [`Duration`].
    pub fn source_budget(&self) -> Duration {
        Duration::from_millis(self.source_budget_ms)
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        let config: EngineConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

/// Fatal configuration errors, surfaced at construction.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("ensemble must contain at least one algorithm")]
    EmptyEnsemble,
    #[error("reseed interval must be non-zero")]
    InvalidInterval,
    #[error("seed buffer size must be non-zero")]
    InvalidSeedSize,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}
