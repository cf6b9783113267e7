use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Weight applied to strategies with no recorded performance
pub const DEFAULT_STRATEGY_WEIGHT: f64 = 0.5;

/// Tracked performance of one strategy in one lottery context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyWeight {
    pub strategy: String,
    pub lottery_context: String,
    /// Voting weight (>= 0)
    pub weight: f64,
    /// 0..1, grows with the number of scored draws
    pub confidence: f64,
    /// Running mean of numbers hit per scored draw
    pub avg_hits: f64,
    pub samples: u32,
    pub updated_at: DateTime<Utc>,
}

impl StrategyWeight {
    /// Entry used when nothing has been recorded yet
    pub fn neutral(strategy: &str, lottery_context: &str, weight: f64) -> Self {
        Self {
            strategy: strategy.to_string(),
            lottery_context: lottery_context.to_string(),
            weight: weight.max(0.0),
            confidence: 0.0,
            avg_hits: 0.0,
            samples: 0,
            updated_at: Utc::now(),
        }
    }
}
