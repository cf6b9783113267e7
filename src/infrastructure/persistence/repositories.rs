pub mod draw_repository;
pub mod strategy_weight_repository;

pub use draw_repository::SqliteDrawRepository;
pub use strategy_weight_repository::SqliteStrategyWeightRepository;
