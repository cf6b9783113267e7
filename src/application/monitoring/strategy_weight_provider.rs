use crate::domain::performance::{DEFAULT_STRATEGY_WEIGHT, StrategyWeight};
use crate::domain::repositories::StrategyWeightRepository;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Supplies ensemble voting weights per strategy and lottery context
#[async_trait]
pub trait StrategyWeightProvider: Send + Sync {
    /// Tracked performance of `strategy`; a neutral entry when nothing is recorded
    async fn get_weight(&self, strategy: &str, lottery_context: &str) -> StrategyWeight;

    /// Name -> weight map for a whole registry
    async fn get_weights(
        &self,
        strategies: &[String],
        lottery_context: &str,
    ) -> HashMap<String, f64> {
        let mut weights = HashMap::with_capacity(strategies.len());
        for strategy in strategies {
            let entry = self.get_weight(strategy, lottery_context).await;
            weights.insert(strategy.clone(), entry.weight);
        }
        weights
    }
}

/// Same weight for every strategy, for tests or safe defaults
pub struct StaticWeightProvider {
    weight: f64,
}

impl StaticWeightProvider {
    pub fn new(weight: f64) -> Self {
        Self { weight }
    }
}

impl Default for StaticWeightProvider {
    fn default() -> Self {
        Self::new(DEFAULT_STRATEGY_WEIGHT)
    }
}

#[async_trait]
impl StrategyWeightProvider for StaticWeightProvider {
    async fn get_weight(&self, strategy: &str, lottery_context: &str) -> StrategyWeight {
        StrategyWeight::neutral(strategy, lottery_context, self.weight)
    }
}

/// Weights recorded by the performance tracker, falling back to a default
pub struct RepositoryWeightProvider {
    repository: Arc<dyn StrategyWeightRepository>,
    default_weight: f64,
}

impl RepositoryWeightProvider {
    pub fn new(repository: Arc<dyn StrategyWeightRepository>, default_weight: f64) -> Self {
        Self {
            repository,
            default_weight,
        }
    }
}

#[async_trait]
impl StrategyWeightProvider for RepositoryWeightProvider {
    async fn get_weight(&self, strategy: &str, lottery_context: &str) -> StrategyWeight {
        match self.repository.find(strategy, lottery_context).await {
            Ok(Some(entry)) => {
                debug!(
                    "StrategyWeights: {}/{} -> {:.3} (confidence {:.2}, {} samples)",
                    strategy, lottery_context, entry.weight, entry.confidence, entry.samples
                );
                entry
            }
            Ok(None) => StrategyWeight::neutral(strategy, lottery_context, self.default_weight),
            Err(e) => {
                warn!(
                    "StrategyWeights: failed to load {}/{}: {}. Using default.",
                    strategy, lottery_context, e
                );
                StrategyWeight::neutral(strategy, lottery_context, self.default_weight)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::InMemoryStrategyWeightRepository;

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticWeightProvider::new(0.8);
        let weights = provider
            .get_weights(&["a".to_string(), "b".to_string()], "megasena")
            .await;
        assert_eq!(weights["a"], 0.8);
        assert_eq!(weights["b"], 0.8);
    }

    #[tokio::test]
    async fn test_repository_provider_defaults_missing_entries() {
        let repository = Arc::new(InMemoryStrategyWeightRepository::new());
        let mut stored = StrategyWeight::neutral("trend", "megasena", 1.7);
        stored.avg_hits = 0.9;
        repository.save(&stored).await.unwrap();

        let provider = RepositoryWeightProvider::new(repository, DEFAULT_STRATEGY_WEIGHT);
        let trend = provider.get_weight("trend", "megasena").await;
        let overdue = provider.get_weight("overdue", "megasena").await;

        assert_eq!(trend.weight, 1.7);
        assert_eq!(trend.avg_hits, 0.9);
        assert_eq!(overdue.weight, DEFAULT_STRATEGY_WEIGHT);
        assert_eq!(overdue.samples, 0);
    }
}
