pub mod csv_import;
pub mod observability;
pub mod persistence;
pub mod repositories;
pub mod simulation;

pub use repositories::{InMemoryDrawRepository, InMemoryStrategyWeightRepository};
