//! Repository Pattern Abstractions
//!
//! This module defines repository traits for data persistence,
//! enabling clean separation between prediction logic and storage implementation.
//!
//! # Design
//!
//! - `DrawRepository`: Persists and retrieves historical draws per lottery context
//! - `StrategyWeightRepository`: Stores per-strategy performance weights
//!
//! # Current Implementation
//!
//! `InMemory` implementations use `Arc<RwLock>` for tests and single-process runs;
//! `Sqlite` implementations back the CLI.
//!
//! # Example
//!
//! ```rust,no_run
//! use lottoscope::domain::repositories::DrawRepository;
//! use lottoscope::infrastructure::InMemoryDrawRepository;
//!
//! # async {
//! let repo = InMemoryDrawRepository::new();
//! let history = repo.find_recent("megasena", 500).await;
//! # };
//! ```

use crate::domain::lottery::Draw;
use crate::domain::performance::StrategyWeight;
use anyhow::Result;
use async_trait::async_trait;

/// Repository for historical draws
#[async_trait]
pub trait DrawRepository: Send + Sync {
    /// Save a draw, replacing any previous draw with the same concurso
    async fn save(&self, lottery_context: &str, draw: &Draw) -> Result<()>;

    /// Most recent draws first, at most `limit`
    async fn find_recent(&self, lottery_context: &str, limit: usize) -> Result<Vec<Draw>>;

    /// Count draws stored for a context
    async fn count(&self, lottery_context: &str) -> Result<usize>;
}

/// Repository for strategy performance weights
#[async_trait]
pub trait StrategyWeightRepository: Send + Sync {
    async fn find(&self, strategy: &str, lottery_context: &str) -> Result<Option<StrategyWeight>>;

    async fn save(&self, weight: &StrategyWeight) -> Result<()>;

    async fn find_all(&self, lottery_context: &str) -> Result<Vec<StrategyWeight>>;
}
