//! Configuration module for lottoscope.
//!
//! This module provides structured configuration loading from environment variables,
//! organized by concern: Lottery, Training, and Ensemble.

mod ensemble_config;
mod lottery_config;
mod training_config;

pub use ensemble_config::EnsembleEnvConfig;
pub use lottery_config::LotteryEnvConfig;
pub use training_config::TrainingEnvConfig;

use crate::application::ml::BoostingConfig;
use crate::application::strategies::TrainingMode;
use crate::domain::lottery::LotteryConfig;
use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Variable lookup, `std::env::var` in production and a map in tests
pub(crate) type Lookup<'a> = &'a dyn Fn(&str) -> Option<String>;

/// Parses `key` when set, `default` otherwise; malformed values are errors.
pub(crate) fn parse_or<T>(lookup: Lookup<'_>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}

/// Like `parse_or` for settings without a default.
pub(crate) fn parse_optional<T>(lookup: Lookup<'_>, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .filter(|raw| !raw.trim().is_empty())
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| anyhow::anyhow!("{}", e))
                .with_context(|| format!("Invalid value for {}: {:?}", key, raw))
        })
        .transpose()
}

/// Main application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub lottery: LotteryEnvConfig,
    pub training: TrainingEnvConfig,
    pub ensemble: EnsembleEnvConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        Ok(Self {
            lottery: LotteryEnvConfig::from_lookup(lookup)
                .context("Failed to load lottery config")?,
            training: TrainingEnvConfig::from_lookup(lookup)
                .context("Failed to load training config")?,
            ensemble: EnsembleEnvConfig::from_lookup(lookup)
                .context("Failed to load ensemble config")?,
        })
    }

    pub fn lottery_config(&self) -> LotteryConfig {
        self.lottery.to_lottery_config()
    }

    pub fn boosting_config(&self) -> BoostingConfig {
        self.training.to_boosting_config()
    }

    pub fn training_mode(&self) -> TrainingMode {
        self.training.mode
    }
}
