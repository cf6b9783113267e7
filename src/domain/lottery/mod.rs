pub mod draw;
pub mod selection;

pub use draw::{Draw, LotteryConfig};
pub use selection::{StrategyPrediction, is_valid_selection, rank_scores, select_top};
