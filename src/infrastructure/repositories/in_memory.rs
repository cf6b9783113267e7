//! In-Memory Repository Implementations
//!
//! Thread-safe, in-memory implementations of the repository traits defined
//! in `domain::repositories`, backed by `Arc<RwLock>`.
//!
//! Data is lost on restart; use the SQLite repositories in
//! `infrastructure::persistence` for anything that must survive.

use crate::domain::lottery::Draw;
use crate::domain::performance::StrategyWeight;
use crate::domain::repositories::{DrawRepository, StrategyWeightRepository};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory implementation of DrawRepository, keyed by context then concurso
pub struct InMemoryDrawRepository {
    draws: Arc<RwLock<HashMap<String, BTreeMap<u32, Draw>>>>,
}

impl InMemoryDrawRepository {
    pub fn new() -> Self {
        Self {
            draws: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryDrawRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DrawRepository for InMemoryDrawRepository {
    async fn save(&self, lottery_context: &str, draw: &Draw) -> Result<()> {
        self.draws
            .write()
            .await
            .entry(lottery_context.to_string())
            .or_default()
            .insert(draw.concurso, draw.clone());
        Ok(())
    }

    async fn find_recent(&self, lottery_context: &str, limit: usize) -> Result<Vec<Draw>> {
        let draws = self.draws.read().await;
        Ok(draws
            .get(lottery_context)
            .map(|by_concurso| by_concurso.values().rev().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn count(&self, lottery_context: &str) -> Result<usize> {
        Ok(self
            .draws
            .read()
            .await
            .get(lottery_context)
            .map_or(0, |by_concurso| by_concurso.len()))
    }
}

/// In-memory implementation of StrategyWeightRepository
pub struct InMemoryStrategyWeightRepository {
    weights: Arc<RwLock<HashMap<(String, String), StrategyWeight>>>,
}

impl InMemoryStrategyWeightRepository {
    pub fn new() -> Self {
        Self {
            weights: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryStrategyWeightRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StrategyWeightRepository for InMemoryStrategyWeightRepository {
    async fn find(&self, strategy: &str, lottery_context: &str) -> Result<Option<StrategyWeight>> {
        let weights = self.weights.read().await;
        Ok(weights
            .get(&(strategy.to_string(), lottery_context.to_string()))
            .cloned())
    }

    async fn save(&self, weight: &StrategyWeight) -> Result<()> {
        self.weights.write().await.insert(
            (weight.strategy.clone(), weight.lottery_context.clone()),
            weight.clone(),
        );
        Ok(())
    }

    async fn find_all(&self, lottery_context: &str) -> Result<Vec<StrategyWeight>> {
        let weights = self.weights.read().await;
        let mut found: Vec<StrategyWeight> = weights
            .values()
            .filter(|w| w.lottery_context == lottery_context)
            .cloned()
            .collect();
        found.sort_by(|a, b| a.strategy.cmp(&b.strategy));
        Ok(found)
    }
}
