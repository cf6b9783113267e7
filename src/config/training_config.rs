//! Boosted tree training parameters from environment variables.

use super::{Lookup, parse_optional, parse_or};
use crate::application::ml::BoostingConfig;
use crate::application::strategies::TrainingMode;
use anyhow::Result;

/// Training environment configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingEnvConfig {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    pub min_samples_split: usize,
    pub subsample: f64,
    pub seed: Option<u64>,
    pub mode: TrainingMode,
}

impl Default for TrainingEnvConfig {
    fn default() -> Self {
        let boosting = BoostingConfig::default();
        Self {
            n_estimators: boosting.n_estimators,
            max_depth: boosting.max_depth,
            learning_rate: boosting.learning_rate,
            min_samples_split: boosting.min_samples_split,
            subsample: boosting.subsample,
            seed: None,
            mode: TrainingMode::Background,
        }
    }
}

impl TrainingEnvConfig {
    pub(crate) fn from_lookup(lookup: Lookup<'_>) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            n_estimators: parse_or(lookup, "GBM_N_ESTIMATORS", defaults.n_estimators)?,
            max_depth: parse_or(lookup, "GBM_MAX_DEPTH", defaults.max_depth)?,
            learning_rate: parse_or(lookup, "GBM_LEARNING_RATE", defaults.learning_rate)?,
            min_samples_split: parse_or(
                lookup,
                "GBM_MIN_SAMPLES_SPLIT",
                defaults.min_samples_split,
            )?,
            subsample: parse_or(lookup, "GBM_SUBSAMPLE", defaults.subsample)?,
            seed: parse_optional(lookup, "GBM_SEED")?,
            mode: parse_or(lookup, "GBM_TRAINING_MODE", defaults.mode)?,
        };

        config.to_boosting_config().validate()?;
        Ok(config)
    }

    pub fn to_boosting_config(&self) -> BoostingConfig {
        BoostingConfig {
            n_estimators: self.n_estimators,
            max_depth: self.max_depth,
            learning_rate: self.learning_rate,
            min_samples_split: self.min_samples_split,
            subsample: self.subsample,
            seed: self.seed,
            ..BoostingConfig::default()
        }
    }
}
