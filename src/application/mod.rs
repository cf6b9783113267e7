// Boosted trees: training, scoring and the per-context model cache
pub mod ml;

// Strategy performance tracking and weight lookup
pub mod monitoring;

// Prediction strategies and the ensemble combiner
pub mod strategies;

// Async facade over repositories and the ensemble
pub mod prediction_service;

pub use prediction_service::PredictionService;
