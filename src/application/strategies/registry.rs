use super::frequency::FrequencyStrategy;
use super::ml_strategy::{GradientBoostingStrategy, TrainingMode};
use super::overdue::OverdueStrategy;
use super::traits::PredictionStrategy;
use super::trend::TrendStrategy;
use crate::application::ml::ModelStore;
use std::sync::Arc;
use tracing::warn;

/// Ordered set of strategies, populated once at startup.
///
/// Registration order is the iteration order, which the ensemble uses to
/// break weight ties.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    strategies: Vec<Arc<dyn PredictionStrategy>>,
}

#[derive(Default)]
pub struct StrategyRegistryBuilder {
    strategies: Vec<Arc<dyn PredictionStrategy>>,
}

impl StrategyRegistryBuilder {
    /// Adds a strategy; a later registration under an existing name replaces it in place.
    pub fn register(mut self, strategy: Arc<dyn PredictionStrategy>) -> Self {
        match self
            .strategies
            .iter()
            .position(|s| s.name() == strategy.name())
        {
            Some(idx) => {
                warn!("StrategyRegistry: replacing strategy '{}'", strategy.name());
                self.strategies[idx] = strategy;
            }
            None => self.strategies.push(strategy),
        }
        self
    }

    pub fn build(self) -> StrategyRegistry {
        StrategyRegistry {
            strategies: self.strategies,
        }
    }
}

impl StrategyRegistry {
    pub fn builder() -> StrategyRegistryBuilder {
        StrategyRegistryBuilder::default()
    }

    /// Boosted scorer plus the frequency, overdue and trend baselines
    pub fn standard(store: Arc<ModelStore>, mode: TrainingMode) -> Self {
        Self::builder()
            .register(Arc::new(GradientBoostingStrategy::new(store, mode)))
            .register(Arc::new(FrequencyStrategy::default()))
            .register(Arc::new(OverdueStrategy::default()))
            .register(Arc::new(TrendStrategy))
            .build()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn PredictionStrategy>> {
        self.strategies.iter().find(|s| s.name() == name).cloned()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn PredictionStrategy>> {
        self.strategies.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.strategies.iter().map(|s| s.name().to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.strategies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("strategies", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_order() {
        let registry = StrategyRegistry::standard(Arc::new(ModelStore::default()), TrainingMode::Inline);
        assert_eq!(
            registry.names(),
            vec!["gradient_boosting", "frequency", "overdue", "trend"]
        );
        assert!(registry.get("overdue").is_some());
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn test_duplicate_name_replaces_in_place() {
        let registry = StrategyRegistry::builder()
            .register(Arc::new(FrequencyStrategy::new(10)))
            .register(Arc::new(TrendStrategy))
            .register(Arc::new(FrequencyStrategy::new(20)))
            .build();
        assert_eq!(registry.names(), vec!["frequency", "trend"]);
        assert_eq!(registry.len(), 2);
    }
}
