use super::traits::{PredictionStrategy, select_by_score};
use crate::domain::errors::PredictionError;
use crate::domain::lottery::{Draw, LotteryConfig};
use crate::domain::ml::FeatureExtractor;
use crate::domain::ml::feature_registry::TREND;

/// Momentum: hits in the last 10 draws minus hits in the 10 before.
#[derive(Debug, Clone, Default)]
pub struct TrendStrategy;

impl TrendStrategy {
    pub const NAME: &'static str = "trend";
}

impl PredictionStrategy for TrendStrategy {
    fn predict(
        &self,
        history: &[Draw],
        config: &LotteryConfig,
    ) -> Result<Vec<u32>, PredictionError> {
        config.validate(history)?;
        let extractor = FeatureExtractor::new(history.len(), config.max_number);
        Ok(select_by_score(config, |number| {
            extractor.extract(number, history)[TREND]
        }))
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_rising_numbers_rank_first() {
        let config = LotteryConfig::new("test", 2, 1, 8);
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        // 7 and 8 dominate the recent block, 1 and 2 the older one
        let history: Vec<Draw> = (0..20)
            .map(|i| {
                let numbers = if i < 10 { vec![7, 8] } else { vec![1, 2] };
                Draw::new(20 - i, date, numbers)
            })
            .collect();

        let numbers = TrendStrategy.predict(&history, &config).unwrap();
        assert_eq!(numbers, vec![7, 8]);
    }
}
