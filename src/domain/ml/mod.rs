pub mod boosted_model;
pub mod decision_tree;
pub mod feature_registry;

pub use boosted_model::{BoostedModel, MAX_TREES_PER_NUMBER, NumberModel};
pub use decision_tree::{DecisionTree, TreeConfig};
pub use feature_registry::{FEATURE_COUNT, FeatureExtractor, FeatureVector};
