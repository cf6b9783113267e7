use crate::domain::errors::TrainingError;
use crate::domain::lottery::Draw;
use crate::domain::ml::feature_registry::DEFAULT_WINDOW_SIZE;
use crate::domain::ml::{
    BoostedModel, DecisionTree, FeatureExtractor, FeatureVector, MAX_TREES_PER_NUMBER,
    NumberModel, TreeConfig,
};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Instant;
use tracing::{debug, info};

/// Numbers with fewer training samples than this are skipped
pub const MIN_SAMPLES_PER_NUMBER: usize = 100;

/// Starting prediction for every sample before the first round
pub const INITIAL_PREDICTION: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostingConfig {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    pub min_samples_split: usize,
    /// Fraction of rows each tree is fitted on (0, 1]
    pub subsample: f64,
    pub window_size: usize,
    /// Fixed seed for reproducible training; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl Default for BoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: 4,
            learning_rate: 0.1,
            min_samples_split: 10,
            subsample: 0.8,
            window_size: DEFAULT_WINDOW_SIZE,
            seed: None,
        }
    }
}

impl BoostingConfig {
    pub fn validate(&self) -> Result<(), TrainingError> {
        if self.n_estimators == 0 {
            return Err(TrainingError::InvalidParameters {
                reason: "n_estimators must be at least 1".to_string(),
            });
        }
        if !(self.learning_rate > 0.0 && self.learning_rate.is_finite()) {
            return Err(TrainingError::InvalidParameters {
                reason: format!("learning_rate must be positive, got {}", self.learning_rate),
            });
        }
        if !(self.subsample > 0.0 && self.subsample <= 1.0) {
            return Err(TrainingError::InvalidParameters {
                reason: format!("subsample must be in (0, 1], got {}", self.subsample),
            });
        }
        if self.window_size == 0 {
            return Err(TrainingError::InvalidParameters {
                reason: "window_size must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    fn tree_config(&self) -> TreeConfig {
        TreeConfig {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
        }
    }
}

/// Summary of one training run
#[derive(Debug, Clone, Serialize)]
pub struct TrainingDiagnostic {
    pub lottery_context: String,
    pub draws_used: usize,
    pub numbers_trained: usize,
    pub numbers_skipped: Vec<u32>,
    pub samples_per_number: usize,
    pub trees_retained: usize,
    /// Mean squared residual of the final boosted predictions across trained numbers
    pub mean_training_loss: f64,
    pub duration_ms: u128,
}

struct NumberTraining {
    model: NumberModel,
    samples: usize,
    loss: f64,
}

/// Residual-fitting boosted trees, one independent ensemble per number.
pub struct BoostedEnsembleTrainer {
    config: BoostingConfig,
}

impl BoostedEnsembleTrainer {
    pub fn new(config: BoostingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BoostingConfig {
        &self.config
    }

    /// Trains a model for every number in the observed range of `draws`.
    ///
    /// `draws[0]` is the most recent draw; `max_number` scales the magnitude feature.
    pub fn train(
        &self,
        lottery_context: &str,
        draws: &[Draw],
        max_number: u32,
    ) -> Result<(BoostedModel, TrainingDiagnostic), TrainingError> {
        self.config.validate()?;

        if draws.len() <= self.config.window_size {
            return Err(TrainingError::InsufficientHistory {
                available: draws.len(),
                required: self.config.window_size,
            });
        }

        let observed = draws.iter().flat_map(|d| d.numbers().iter().copied());
        let (Some(min_observed), Some(max_observed)) =
            (observed.clone().min(), observed.max())
        else {
            return Err(TrainingError::InsufficientHistory {
                available: 0,
                required: self.config.window_size,
            });
        };

        info!(
            "Trainer: {} - boosting numbers {}..={} on {} draws ({} rounds, depth {}, lr {})",
            lottery_context,
            min_observed,
            max_observed,
            draws.len(),
            self.config.n_estimators,
            self.config.max_depth,
            self.config.learning_rate
        );

        let started = Instant::now();
        let extractor = FeatureExtractor::new(self.config.window_size, max_number);

        let results: Vec<(u32, Option<NumberTraining>)> = (min_observed..=max_observed)
            .into_par_iter()
            .map(|number| (number, self.train_number(number, draws, &extractor)))
            .collect();

        let mut model = BoostedModel::new(lottery_context, draws.len());
        let mut skipped = Vec::new();
        let mut samples_per_number = 0;
        let mut loss_total = 0.0;

        for (number, outcome) in results {
            match outcome {
                Some(training) => {
                    samples_per_number = samples_per_number.max(training.samples);
                    loss_total += training.loss;
                    model.insert(number, training.model);
                }
                None => skipped.push(number),
            }
        }

        let diagnostic = TrainingDiagnostic {
            lottery_context: lottery_context.to_string(),
            draws_used: draws.len(),
            numbers_trained: model.len(),
            mean_training_loss: if model.is_empty() {
                0.0
            } else {
                loss_total / model.len() as f64
            },
            numbers_skipped: skipped,
            samples_per_number,
            trees_retained: model.total_trees(),
            duration_ms: started.elapsed().as_millis(),
        };

        info!(
            "Trainer: {} - trained {} numbers ({} skipped), {} trees retained, loss {:.5} in {}ms",
            lottery_context,
            diagnostic.numbers_trained,
            diagnostic.numbers_skipped.len(),
            diagnostic.trees_retained,
            diagnostic.mean_training_loss,
            diagnostic.duration_ms
        );

        Ok((model, diagnostic))
    }

    /// Sliding-window samples: the window starting at offset `i` predicts draw `i - 1`.
    pub fn build_samples(
        &self,
        number: u32,
        draws: &[Draw],
        extractor: &FeatureExtractor,
    ) -> (Vec<FeatureVector>, Vec<f64>) {
        let last_offset = draws.len().saturating_sub(extractor.window_size());
        (1..=last_offset)
            .map(|offset| {
                let features = extractor.extract(number, &draws[offset..]);
                let target = if draws[offset - 1].contains(number) {
                    1.0
                } else {
                    0.0
                };
                (features, target)
            })
            .unzip()
    }

    fn train_number(
        &self,
        number: u32,
        draws: &[Draw],
        extractor: &FeatureExtractor,
    ) -> Option<NumberTraining> {
        let (features, targets) = self.build_samples(number, draws, extractor);
        let n = features.len();
        if n < MIN_SAMPLES_PER_NUMBER {
            debug!(
                "Trainer: skipping {} ({} samples < {})",
                number, n, MIN_SAMPLES_PER_NUMBER
            );
            return None;
        }

        let mut rng = self.rng_for(number);
        let tree_config = self.config.tree_config();
        let sample_size = ((n as f64 * self.config.subsample).round() as usize).clamp(1, n);

        let mut predictions = vec![INITIAL_PREDICTION; n];
        let mut trees: VecDeque<DecisionTree> = VecDeque::with_capacity(MAX_TREES_PER_NUMBER + 1);

        for _ in 0..self.config.n_estimators {
            let residuals: Vec<f64> = targets
                .iter()
                .zip(&predictions)
                .map(|(target, prediction)| target - prediction)
                .collect();

            let rows = index::sample(&mut rng, n, sample_size).into_vec();
            let sub_x: Vec<&FeatureVector> = rows.iter().map(|&r| &features[r]).collect();
            let sub_y: Vec<f64> = rows.iter().map(|&r| residuals[r]).collect();

            let tree = DecisionTree::build(&sub_x, &sub_y, &tree_config);

            for (prediction, row) in predictions.iter_mut().zip(&features) {
                *prediction += self.config.learning_rate * tree.predict(row);
            }

            trees.push_back(tree);
            if trees.len() > MAX_TREES_PER_NUMBER {
                trees.pop_front();
            }
        }

        let positives = targets.iter().filter(|&&t| t > 0.5).count();
        let loss = targets
            .iter()
            .zip(&predictions)
            .map(|(t, p)| (t - p).powi(2))
            .sum::<f64>()
            / n as f64;

        debug!(
            "Trainer: number {} - {} samples, {} positives, loss {:.5}",
            number, n, positives, loss
        );

        Some(NumberTraining {
            model: NumberModel::new(trees.into(), positives as f64 / n as f64),
            samples: n,
            loss,
        })
    }

    /// Per-number RNG so parallel training stays reproducible under a fixed seed.
    fn rng_for(&self, number: u32) -> StdRng {
        match self.config.seed {
            Some(seed) => {
                StdRng::seed_from_u64(seed ^ (number as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
            }
            None => StdRng::from_os_rng(),
        }
    }
}

impl Default for BoostedEnsembleTrainer {
    fn default() -> Self {
        Self::new(BoostingConfig::default())
    }
}
