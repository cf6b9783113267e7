mod ensemble;
mod frequency;
mod ml_strategy;
mod overdue;
mod registry;
mod traits;
mod trend;

pub use ensemble::{
    DEFAULT_GAME_COUNT, DiversifiedSet, EnsembleResult, EnsembleStrategy, StrategyContribution,
    TOP_CONTRIBUTORS, VARIATION_ATTEMPTS,
};
pub use frequency::FrequencyStrategy;
pub use ml_strategy::{GradientBoostingStrategy, TrainingMode};
pub use overdue::OverdueStrategy;
pub use registry::{StrategyRegistry, StrategyRegistryBuilder};
pub use traits::PredictionStrategy;
pub use trend::TrendStrategy;
