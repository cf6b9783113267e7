use crate::domain::lottery::{Draw, LotteryConfig, StrategyPrediction};
use crate::domain::performance::{DEFAULT_STRATEGY_WEIGHT, StrategyWeight};
use crate::domain::repositories::StrategyWeightRepository;
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::info;

/// Scored draws needed for full confidence
pub const FULL_CONFIDENCE_SAMPLES: f64 = 20.0;

pub const MIN_WEIGHT: f64 = 0.1;
pub const MAX_WEIGHT: f64 = 3.0;

/// Expected hits of a uniformly random `picked`-number ticket against a `drawn`-number draw
pub fn expected_random_hits(picked: usize, drawn: usize, range_size: usize) -> f64 {
    if range_size == 0 {
        return 0.0;
    }
    picked as f64 * drawn as f64 / range_size as f64
}

/// Folds one scored draw into a strategy's running performance.
///
/// `avg_hits` is a running mean, confidence grows linearly to 1 over
/// `FULL_CONFIDENCE_SAMPLES`, and the weight is the hit rate relative to
/// random play, clamped to `[MIN_WEIGHT, MAX_WEIGHT]`.
pub fn apply_hits(previous: &StrategyWeight, hits: usize, expected_hits: f64) -> StrategyWeight {
    let samples = previous.samples.saturating_add(1);
    let avg_hits = previous.avg_hits + (hits as f64 - previous.avg_hits) / samples as f64;
    let weight = if expected_hits > 0.0 {
        (avg_hits / expected_hits).clamp(MIN_WEIGHT, MAX_WEIGHT)
    } else {
        previous.weight
    };

    StrategyWeight {
        strategy: previous.strategy.clone(),
        lottery_context: previous.lottery_context.clone(),
        weight,
        confidence: (samples as f64 / FULL_CONFIDENCE_SAMPLES).min(1.0),
        avg_hits,
        samples,
        updated_at: Utc::now(),
    }
}

/// Scores past strategy predictions against real draws and persists the resulting weights
pub struct PerformanceTracker {
    repository: Arc<dyn StrategyWeightRepository>,
    default_weight: f64,
}

impl PerformanceTracker {
    pub fn new(repository: Arc<dyn StrategyWeightRepository>) -> Self {
        Self {
            repository,
            default_weight: DEFAULT_STRATEGY_WEIGHT,
        }
    }

    pub fn with_default_weight(mut self, weight: f64) -> Self {
        self.default_weight = weight;
        self
    }

    /// Updates every strategy in `predictions` with its hits against `actual`.
    pub async fn record_draw(
        &self,
        config: &LotteryConfig,
        predictions: &[StrategyPrediction],
        actual: &Draw,
    ) -> Result<Vec<StrategyWeight>> {
        let context = config.lottery_context.as_str();
        let mut updated = Vec::with_capacity(predictions.len());

        for prediction in predictions {
            let previous = self
                .repository
                .find(&prediction.strategy, context)
                .await
                .with_context(|| format!("Failed to load weight for {}", prediction.strategy))?
                .unwrap_or_else(|| {
                    StrategyWeight::neutral(&prediction.strategy, context, self.default_weight)
                });

            let hits = prediction
                .numbers
                .iter()
                .filter(|&&n| actual.contains(n))
                .count();
            let expected = expected_random_hits(
                prediction.numbers.len(),
                actual.numbers().len(),
                config.range_size(),
            );
            let next = apply_hits(&previous, hits, expected);

            info!(
                "PerformanceTracker: {} hit {}/{} on #{} -> weight {:.3} (avg {:.2}, {} samples)",
                prediction.strategy,
                hits,
                prediction.numbers.len(),
                actual.concurso,
                next.weight,
                next.avg_hits,
                next.samples
            );

            self.repository
                .save(&next)
                .await
                .with_context(|| format!("Failed to save weight for {}", prediction.strategy))?;
            updated.push(next);
        }

        Ok(updated)
    }
}
