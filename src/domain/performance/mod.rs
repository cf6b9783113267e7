// Strategy performance tracking domain
pub mod strategy_weight;

pub use strategy_weight::{DEFAULT_STRATEGY_WEIGHT, StrategyWeight};
