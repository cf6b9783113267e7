// Strategy performance tracking and weight lookup
pub mod performance_tracker;
pub mod strategy_weight_provider;

pub use performance_tracker::PerformanceTracker;
pub use strategy_weight_provider::{
    RepositoryWeightProvider, StaticWeightProvider, StrategyWeightProvider,
};
