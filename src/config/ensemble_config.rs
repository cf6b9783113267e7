//! Ensemble and storage settings from environment variables.

use super::{Lookup, parse_optional, parse_or};
use crate::application::strategies::DEFAULT_GAME_COUNT;
use crate::domain::performance::DEFAULT_STRATEGY_WEIGHT;
use anyhow::Result;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/lottoscope.db";

/// Ensemble environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EnsembleEnvConfig {
    /// Fixes fallback sampling and game variations
    pub seed: Option<u64>,
    pub game_count: usize,
    pub default_strategy_weight: f64,
    pub database_url: String,
}

impl Default for EnsembleEnvConfig {
    fn default() -> Self {
        Self {
            seed: None,
            game_count: DEFAULT_GAME_COUNT,
            default_strategy_weight: DEFAULT_STRATEGY_WEIGHT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
        }
    }
}

impl EnsembleEnvConfig {
    pub(crate) fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            seed: parse_optional(lookup, "ENSEMBLE_SEED")?,
            game_count: parse_or(lookup, "ENSEMBLE_GAME_COUNT", defaults.game_count)?,
            default_strategy_weight: parse_or(
                lookup,
                "DEFAULT_STRATEGY_WEIGHT",
                defaults.default_strategy_weight,
            )?,
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
        };

        if !(config.default_strategy_weight >= 0.0 && config.default_strategy_weight.is_finite()) {
            anyhow::bail!(
                "DEFAULT_STRATEGY_WEIGHT must be a non-negative number, got {}",
                config.default_strategy_weight
            );
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensemble_defaults() {
        let config = EnsembleEnvConfig::from_lookup(&|_| None).unwrap();
        assert_eq!(config, EnsembleEnvConfig::default());
        assert_eq!(config.game_count, 5);
        assert_eq!(config.default_strategy_weight, 0.5);
    }

    #[test]
    fn test_negative_default_weight_is_rejected() {
        let result = EnsembleEnvConfig::from_lookup(&|key| {
            (key == "DEFAULT_STRATEGY_WEIGHT").then(|| "-1".to_string())
        });
        assert!(result.is_err());
    }
}
