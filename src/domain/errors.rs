use thiserror::Error;

/// Errors raised while producing a number selection
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("Strategy {strategy} failed: {reason}")]
    StrategyFailure { strategy: String, reason: String },
}

impl PredictionError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        PredictionError::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    pub fn strategy(strategy: impl Into<String>, reason: impl Into<String>) -> Self {
        PredictionError::StrategyFailure {
            strategy: strategy.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by the boosted tree trainer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrainingError {
    #[error("Insufficient history: {available} draws available, need more than {required}")]
    InsufficientHistory { available: usize, required: usize },

    #[error("Invalid training parameters: {reason}")]
    InvalidParameters { reason: String },
}
