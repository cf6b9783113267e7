pub mod model_store;
pub mod predictor;
pub mod trainer;

pub use model_store::{MIN_TRAINING_DRAWS, ModelStore};
pub use predictor::{BoostedScorer, HeuristicScorer, NumberScorer};
pub use trainer::{BoostedEnsembleTrainer, BoostingConfig, TrainingDiagnostic};
