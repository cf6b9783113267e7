use super::traits::{PredictionStrategy, select_by_score};
use crate::domain::errors::PredictionError;
use crate::domain::lottery::{Draw, LotteryConfig};
use crate::domain::ml::FeatureExtractor;
use crate::domain::ml::feature_registry::{DEFAULT_WINDOW_SIZE, FREQUENCY};

/// Hot numbers: most hits inside the lookback window.
#[derive(Debug, Clone)]
pub struct FrequencyStrategy {
    lookback: usize,
}

impl FrequencyStrategy {
    pub const NAME: &'static str = "frequency";

    pub fn new(lookback: usize) -> Self {
        Self {
            lookback: lookback.max(1),
        }
    }
}

impl Default for FrequencyStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

impl PredictionStrategy for FrequencyStrategy {
    fn predict(
        &self,
        history: &[Draw],
        config: &LotteryConfig,
    ) -> Result<Vec<u32>, PredictionError> {
        config.validate(history)?;
        let extractor = FeatureExtractor::new(self.lookback, config.max_number);
        Ok(select_by_score(config, |number| {
            extractor.extract(number, history)[FREQUENCY]
        }))
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}
