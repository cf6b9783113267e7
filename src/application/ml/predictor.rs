use crate::domain::ml::feature_registry::{FREQUENCY, GAP_RATIO, TREND};
use crate::domain::ml::{BoostedModel, FeatureVector};
use std::sync::Arc;

/// Interface for per-number likelihood scorers
pub trait NumberScorer: Send + Sync {
    /// Higher means more likely to appear in the next draw
    fn score(&self, number: u32, features: &FeatureVector) -> f64;

    /// Get scorer name/type
    fn name(&self) -> &str;
}

/// Mean output of a number's retained boosted trees.
/// Numbers the model has no trees for score 0.0.
pub struct BoostedScorer {
    model: Arc<BoostedModel>,
}

impl BoostedScorer {
    pub fn new(model: Arc<BoostedModel>) -> Self {
        Self { model }
    }
}

impl NumberScorer for BoostedScorer {
    fn score(&self, number: u32, features: &FeatureVector) -> f64 {
        self.model.score(number, features).unwrap_or(0.0)
    }

    fn name(&self) -> &str {
        "boosted"
    }
}

/// Fallback used until a boosted model exists:
/// `0.4 * gap_ratio + 0.3 * frequency + 0.3 * trend`
pub struct HeuristicScorer;

impl NumberScorer for HeuristicScorer {
    fn score(&self, _number: u32, features: &FeatureVector) -> f64 {
        0.4 * features[GAP_RATIO] + 0.3 * features[FREQUENCY] + 0.3 * features[TREND]
    }

    fn name(&self) -> &str {
        "heuristic"
    }
}
