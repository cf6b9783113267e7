use crate::application::monitoring::{
    PerformanceTracker, RepositoryWeightProvider, StrategyWeightProvider,
};
use crate::application::strategies::{
    DiversifiedSet, EnsembleResult, EnsembleStrategy, PredictionStrategy, StrategyRegistry,
};
use crate::domain::lottery::{Draw, LotteryConfig};
use crate::domain::performance::{DEFAULT_STRATEGY_WEIGHT, StrategyWeight};
use crate::domain::repositories::{DrawRepository, StrategyWeightRepository};
use crate::infrastructure::observability::Metrics;
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

/// Draws loaded per prediction
pub const DEFAULT_HISTORY_LIMIT: usize = 1000;

/// Async entry point: loads history and weights, then runs the ensemble on the blocking pool.
pub struct PredictionService {
    draws: Arc<dyn DrawRepository>,
    weights: Arc<dyn StrategyWeightRepository>,
    weight_provider: Arc<dyn StrategyWeightProvider>,
    custom_provider: bool,
    tracker: PerformanceTracker,
    registry: StrategyRegistry,
    default_weight: f64,
    seed: Option<u64>,
    history_limit: usize,
    metrics: Option<Metrics>,
}

impl PredictionService {
    pub fn new(
        draws: Arc<dyn DrawRepository>,
        weights: Arc<dyn StrategyWeightRepository>,
        registry: StrategyRegistry,
    ) -> Self {
        Self {
            draws,
            weight_provider: Arc::new(RepositoryWeightProvider::new(
                weights.clone(),
                DEFAULT_STRATEGY_WEIGHT,
            )),
            custom_provider: false,
            tracker: PerformanceTracker::new(weights.clone()),
            weights,
            registry,
            default_weight: DEFAULT_STRATEGY_WEIGHT,
            seed: None,
            history_limit: DEFAULT_HISTORY_LIMIT,
            metrics: None,
        }
    }

    pub fn with_weight_provider(mut self, provider: Arc<dyn StrategyWeightProvider>) -> Self {
        self.weight_provider = provider;
        self.custom_provider = true;
        self
    }

    /// Weight for strategies with no stored performance yet, used for voting
    /// and as the starting point of their first update.
    pub fn with_default_weight(mut self, weight: f64) -> Self {
        self.default_weight = weight;
        if !self.custom_provider {
            self.weight_provider =
                Arc::new(RepositoryWeightProvider::new(self.weights.clone(), weight));
        }
        self.tracker = PerformanceTracker::new(self.weights.clone()).with_default_weight(weight);
        self
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(1);
        self
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub async fn load_history(&self, config: &LotteryConfig) -> Result<Vec<Draw>> {
        self.draws
            .find_recent(&config.lottery_context, self.history_limit)
            .await
            .with_context(|| format!("Failed to load history for {}", config.lottery_context))
    }

    async fn ensemble(&self, config: &LotteryConfig) -> EnsembleStrategy {
        let weights = self
            .weight_provider
            .get_weights(&self.registry.names(), &config.lottery_context)
            .await;

        let mut ensemble = EnsembleStrategy::new(self.registry.clone())
            .with_weights(weights)
            .with_default_weight(self.default_weight);
        if let Some(seed) = self.seed {
            ensemble = ensemble.with_seed(seed);
        }
        if let Some(metrics) = &self.metrics {
            ensemble = ensemble.with_metrics(metrics.clone());
        }
        ensemble
    }

    /// Runs `job` against freshly loaded history off the async runtime.
    async fn run<T, F>(&self, config: &LotteryConfig, kind: &str, job: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&EnsembleStrategy, &[Draw], &LotteryConfig) -> Result<T> + Send + 'static,
    {
        let history = self.load_history(config).await?;
        let ensemble = self.ensemble(config).await;
        let config = config.clone();

        let output = tokio::task::spawn_blocking(move || job(&ensemble, &history, &config))
            .await
            .context("Prediction task panicked")??;

        if let Some(metrics) = &self.metrics {
            metrics.inc_predictions(kind);
        }
        Ok(output)
    }

    pub async fn predict(&self, config: &LotteryConfig) -> Result<Vec<u32>> {
        self.run(config, "predict", |ensemble, history, config| {
            Ok(ensemble.predict(history, config)?)
        })
        .await
    }

    pub async fn predict_with_consensus(&self, config: &LotteryConfig) -> Result<EnsembleResult> {
        self.run(config, "consensus", |ensemble, history, config| {
            Ok(ensemble.predict_with_consensus(history, config)?)
        })
        .await
    }

    pub async fn predict_diversified(
        &self,
        config: &LotteryConfig,
        game_count: usize,
    ) -> Result<DiversifiedSet> {
        self.run(config, "diversified", move |ensemble, history, config| {
            Ok(ensemble.predict_diversified(history, config, game_count)?)
        })
        .await
    }

    /// Scores every strategy on the history preceding `actual`, updates their
    /// weights, then stores `actual`.
    pub async fn record_draw(
        &self,
        config: &LotteryConfig,
        actual: Draw,
    ) -> Result<Vec<StrategyWeight>> {
        let concurso = actual.concurso;
        let history: Vec<Draw> = self
            .load_history(config)
            .await?
            .into_iter()
            .filter(|d| d.concurso < concurso)
            .collect();

        let updated = if history.is_empty() {
            warn!(
                "PredictionService: no history before #{} for {}, storing draw without scoring",
                concurso, config.lottery_context
            );
            Vec::new()
        } else {
            let ensemble = self.ensemble(config).await;
            let job_config = config.clone();
            let predictions = tokio::task::spawn_blocking(move || {
                ensemble.strategy_predictions(&history, &job_config)
            })
            .await
            .context("Scoring task panicked")??;

            self.tracker
                .record_draw(config, &predictions, &actual)
                .await?
        };

        self.draws
            .save(&config.lottery_context, &actual)
            .await
            .context("Failed to store recorded draw")?;
        info!(
            "PredictionService: recorded #{} for {} ({} strategies scored)",
            concurso,
            config.lottery_context,
            updated.len()
        );
        Ok(updated)
    }
}
