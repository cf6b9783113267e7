use crate::domain::errors::PredictionError;
use crate::domain::lottery::{Draw, LotteryConfig, select_top};

/// Anything that can propose a number selection for the next draw.
pub trait PredictionStrategy: Send + Sync {
    /// Returns `config.numbers_to_draw` distinct numbers, ascending, within the configured range.
    ///
    /// `history[0]` is the most recent draw.
    fn predict(&self, history: &[Draw], config: &LotteryConfig)
    -> Result<Vec<u32>, PredictionError>;

    /// Registry key, also used for weight lookup
    fn name(&self) -> &str;

    /// Builds whatever state `predict` would otherwise defer, blocking until it is ready.
    /// Called before predictions are scored against a real draw.
    fn prepare(&self, _history: &[Draw], _config: &LotteryConfig) {}
}

/// Scores every number in range and keeps the best `numbers_to_draw` (ties: lower number first).
pub(crate) fn select_by_score<F>(config: &LotteryConfig, mut score: F) -> Vec<u32>
where
    F: FnMut(u32) -> f64,
{
    let scores: Vec<(u32, f64)> = config.numbers().map(|n| (n, score(n))).collect();
    select_top(scores, config.numbers_to_draw)
}
