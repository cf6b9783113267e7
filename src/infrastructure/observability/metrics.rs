//! Prometheus metrics definitions for lottoscope
//!
//! All metrics use the `lottoscope_` prefix.

use prometheus::{CounterVec, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder};
use std::sync::Arc;

/// Prometheus metrics for the prediction engine
#[derive(Clone)]
pub struct Metrics {
    registry: Arc<Registry>,
    /// Boosted model training runs by context and outcome
    pub training_runs_total: CounterVec,
    /// Training wall time in seconds
    pub training_duration_seconds: HistogramVec,
    /// Model cache lookups by result (hit/miss)
    pub model_cache_total: CounterVec,
    /// Strategies excluded from an ensemble round
    pub strategy_failures_total: CounterVec,
    /// Results produced through a fallback path
    pub degraded_predictions_total: CounterVec,
    /// Predictions served by kind (predict/consensus/diversified)
    pub predictions_total: CounterVec,
}

impl Metrics {
    /// Create a new Metrics instance with all counters registered
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let training_runs_total = CounterVec::new(
            Opts::new(
                "lottoscope_training_runs_total",
                "Boosted model training runs by context and outcome",
            ),
            &["lottery_context", "outcome"],
        )?;
        registry.register(Box::new(training_runs_total.clone()))?;

        let training_duration_seconds = HistogramVec::new(
            HistogramOpts::new(
                "lottoscope_training_duration_seconds",
                "Boosted model training duration in seconds",
            )
            .buckets(vec![0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
            &["lottery_context"],
        )?;
        registry.register(Box::new(training_duration_seconds.clone()))?;

        let model_cache_total = CounterVec::new(
            Opts::new("lottoscope_model_cache_total", "Model cache lookups by result"),
            &["result"],
        )?;
        registry.register(Box::new(model_cache_total.clone()))?;

        let strategy_failures_total = CounterVec::new(
            Opts::new(
                "lottoscope_strategy_failures_total",
                "Strategies excluded from an ensemble round",
            ),
            &["strategy"],
        )?;
        registry.register(Box::new(strategy_failures_total.clone()))?;

        let degraded_predictions_total = CounterVec::new(
            Opts::new(
                "lottoscope_degraded_predictions_total",
                "Predictions produced through a fallback path",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(degraded_predictions_total.clone()))?;

        let predictions_total = CounterVec::new(
            Opts::new("lottoscope_predictions_total", "Predictions served by kind"),
            &["kind"],
        )?;
        registry.register(Box::new(predictions_total.clone()))?;

        Ok(Self {
            registry: Arc::new(registry),
            training_runs_total,
            training_duration_seconds,
            model_cache_total,
            strategy_failures_total,
            degraded_predictions_total,
            predictions_total,
        })
    }

    /// Render all metrics in Prometheus text format
    pub fn render(&self) -> String {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        encoder
            .encode_to_string(&metric_families)
            .unwrap_or_default()
    }

    pub fn inc_strategy_failure(&self, strategy: &str) {
        self.strategy_failures_total
            .with_label_values(&[strategy])
            .inc();
    }

    pub fn inc_degraded(&self, reason: &str) {
        self.degraded_predictions_total
            .with_label_values(&[reason])
            .inc();
    }

    pub fn inc_predictions(&self, kind: &str) {
        self.predictions_total.with_label_values(&[kind]).inc();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.inc_predictions("predict");
        assert!(metrics.render().contains("lottoscope_predictions_total"));
    }

    #[test]
    fn test_strategy_failure_counter() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics.inc_strategy_failure("frequency");
        metrics.inc_strategy_failure("frequency");
        let output = metrics.render();
        assert!(output.contains("lottoscope_strategy_failures_total{strategy=\"frequency\"} 2"));
    }

    #[test]
    fn test_training_histogram() {
        let metrics = Metrics::new().expect("Failed to create metrics");
        metrics
            .training_duration_seconds
            .with_label_values(&["megasena"])
            .observe(1.5);
        assert!(
            metrics
                .render()
                .contains("lottoscope_training_duration_seconds_count{lottery_context=\"megasena\"} 1")
        );
    }
}
