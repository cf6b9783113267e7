use super::traits::{PredictionStrategy, select_by_score};
use crate::application::ml::model_store::MIN_TRAINING_DRAWS;
use crate::application::ml::predictor::{BoostedScorer, HeuristicScorer, NumberScorer};
use crate::application::ml::ModelStore;
use crate::domain::errors::PredictionError;
use crate::domain::lottery::{Draw, LotteryConfig};
use crate::domain::ml::FeatureExtractor;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::Arc;
use tracing::debug;

/// When a missing model gets trained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TrainingMode {
    /// Train on the calling thread, blocking the prediction
    Inline,
    /// Hand training to a worker thread and score heuristically until it lands
    #[default]
    Background,
}

impl FromStr for TrainingMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inline" => Ok(TrainingMode::Inline),
            "background" => Ok(TrainingMode::Background),
            _ => anyhow::bail!("Invalid training mode: {} (expected inline|background)", s),
        }
    }
}

/// Ranks numbers by boosted-tree likelihood, or by the gap/frequency/trend
/// heuristic while no model is available for the context.
pub struct GradientBoostingStrategy {
    store: Arc<ModelStore>,
    mode: TrainingMode,
}

impl GradientBoostingStrategy {
    pub const NAME: &'static str = "gradient_boosting";

    pub fn new(store: Arc<ModelStore>, mode: TrainingMode) -> Self {
        Self { store, mode }
    }

    fn scorer(&self, history: &[Draw], config: &LotteryConfig) -> Box<dyn NumberScorer> {
        let model = match self.mode {
            TrainingMode::Inline => self.store.get_or_create(config, history),
            TrainingMode::Background => {
                let cached = self.store.get(&config.lottery_context);
                if cached.is_none() && history.len() > MIN_TRAINING_DRAWS {
                    self.store
                        .request_background_training(config, history.to_vec());
                }
                cached
            }
        };

        match model {
            Some(model) => Box::new(BoostedScorer::new(model)),
            None => Box::new(HeuristicScorer),
        }
    }
}

impl PredictionStrategy for GradientBoostingStrategy {
    fn predict(
        &self,
        history: &[Draw],
        config: &LotteryConfig,
    ) -> Result<Vec<u32>, PredictionError> {
        config.validate(history)?;

        let scorer = self.scorer(history, config);
        let extractor = FeatureExtractor::new(self.store.window_size(), config.max_number);

        debug!(
            "GradientBoosting: scoring {} numbers for {} with {} scorer",
            config.range_size(),
            config.lottery_context,
            scorer.name()
        );

        Ok(select_by_score(config, |number| {
            scorer.score(number, &extractor.extract(number, history))
        }))
    }

    fn name(&self) -> &str {
        Self::NAME
    }

    fn prepare(&self, history: &[Draw], config: &LotteryConfig) {
        if self.store.get_or_create(config, history).is_some() {
            debug!(
                "GradientBoosting: model ready for {} before scoring",
                config.lottery_context
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ml::{BoostedEnsembleTrainer, BoostingConfig};
    use crate::domain::lottery::is_valid_selection;
    use crate::infrastructure::simulation::SyntheticDrawGenerator;

    fn store() -> Arc<ModelStore> {
        Arc::new(ModelStore::new(BoostedEnsembleTrainer::new(BoostingConfig {
            n_estimators: 4,
            max_depth: 2,
            seed: Some(5),
            ..BoostingConfig::default()
        })))
    }

    #[test]
    fn test_heuristic_selection_on_short_history() {
        let config = LotteryConfig::mega_sena();
        let history = SyntheticDrawGenerator::new(6, 1, 60).with_seed(1).generate(80);
        let strategy = GradientBoostingStrategy::new(store(), TrainingMode::Inline);

        let numbers = strategy.predict(&history, &config).unwrap();
        assert!(is_valid_selection(&numbers, &config));
    }

    #[test]
    fn test_inline_mode_trains_and_caches() {
        let config = LotteryConfig::new("mini", 5, 1, 20);
        let history = SyntheticDrawGenerator::new(5, 1, 20).with_seed(2).generate(230);
        let store = store();
        let strategy = GradientBoostingStrategy::new(Arc::clone(&store), TrainingMode::Inline);

        let first = strategy.predict(&history, &config).unwrap();
        let second = strategy.predict(&history, &config).unwrap();

        assert!(is_valid_selection(&first, &config));
        assert_eq!(first, second);
        assert_eq!(store.training_runs(), 1);
    }

    #[test]
    fn test_background_mode_returns_immediately() {
        let config = LotteryConfig::new("mini-bg", 5, 1, 20);
        let history = SyntheticDrawGenerator::new(5, 1, 20).with_seed(3).generate(230);
        let store = store();
        let strategy = GradientBoostingStrategy::new(Arc::clone(&store), TrainingMode::Background);

        let numbers = strategy.predict(&history, &config).unwrap();
        assert!(is_valid_selection(&numbers, &config));
    }

    #[test]
    fn test_invalid_configuration_is_rejected() {
        let config = LotteryConfig::new("tiny", 7, 1, 6);
        let history = SyntheticDrawGenerator::new(3, 1, 6).with_seed(4).generate(10);
        let strategy = GradientBoostingStrategy::new(store(), TrainingMode::Inline);

        let err = strategy.predict(&history, &config).unwrap_err();
        assert!(matches!(err, PredictionError::InvalidConfiguration { .. }));
        assert!(strategy.predict(&[], &LotteryConfig::mega_sena()).is_err());
    }

    #[test]
    fn test_training_mode_parsing() {
        assert_eq!("inline".parse::<TrainingMode>().unwrap(), TrainingMode::Inline);
        assert_eq!(
            "Background".parse::<TrainingMode>().unwrap(),
            TrainingMode::Background
        );
        assert!("later".parse::<TrainingMode>().is_err());
    }
}
