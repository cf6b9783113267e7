use super::traits::{PredictionStrategy, select_by_score};
use crate::domain::errors::PredictionError;
use crate::domain::lottery::{Draw, LotteryConfig};
use crate::domain::ml::FeatureExtractor;
use crate::domain::ml::feature_registry::{DEFAULT_WINDOW_SIZE, GAP_RATIO};

/// Cold numbers: longest current absence relative to their usual spacing.
#[derive(Debug, Clone)]
pub struct OverdueStrategy {
    window_size: usize,
}

impl OverdueStrategy {
    pub const NAME: &'static str = "overdue";

    pub fn new(window_size: usize) -> Self {
        Self {
            window_size: window_size.max(1),
        }
    }
}

impl Default for OverdueStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE)
    }
}

impl PredictionStrategy for OverdueStrategy {
    fn predict(
        &self,
        history: &[Draw],
        config: &LotteryConfig,
    ) -> Result<Vec<u32>, PredictionError> {
        config.validate(history)?;
        let extractor = FeatureExtractor::new(self.window_size, config.max_number);
        Ok(select_by_score(config, |number| {
            extractor.extract(number, history)[GAP_RATIO]
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

    fn draw(concurso: u32, numbers: &[u32]) -> Draw {
        Draw::new(
            concurso,
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            numbers.to_vec(),
        )
    }

    #[test]
    fn test_prefers_numbers_absent_longer_than_usual() {
        let config = LotteryConfig::new("test", 1, 1, 4);
        // 1 hits every draw (ratio 0), 2 every other draw (ratio 1),
        // 3 only in the two oldest draws (gap 4 over spacing 1)
        let history = vec![
            draw(6, &[1]),
            draw(5, &[1]),
            draw(4, &[1, 2]),
            draw(3, &[1]),
            draw(2, &[1, 2, 3]),
            draw(1, &[1, 3]),
        ];

        let numbers = OverdueStrategy::new(6).predict(&history, &config).unwrap();
        assert_eq!(numbers, vec![3]);
    }
}
