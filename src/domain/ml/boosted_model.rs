use super::decision_tree::DecisionTree;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Trees kept per number; older boosting rounds are dropped.
pub const MAX_TREES_PER_NUMBER: usize = 10;

/// Trees and base rate for a single candidate number
#[derive(Debug, Clone, PartialEq)]
pub struct NumberModel {
    trees: Vec<DecisionTree>,
    /// Fraction of training samples where the number was drawn
    pub base_weight: f64,
}

impl NumberModel {
    /// Keeps only the last `MAX_TREES_PER_NUMBER` trees.
    pub fn new(mut trees: Vec<DecisionTree>, base_weight: f64) -> Self {
        if trees.len() > MAX_TREES_PER_NUMBER {
            trees.drain(..trees.len() - MAX_TREES_PER_NUMBER);
        }
        Self { trees, base_weight }
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Mean output of the retained trees, `None` without trees.
    pub fn score(&self, features: &[f64]) -> Option<f64> {
        if self.trees.is_empty() {
            return None;
        }
        let total: f64 = self.trees.iter().map(|t| t.predict(features)).sum();
        Some(total / self.trees.len() as f64)
    }
}

/// Boosted trees for one lottery context.
///
/// Immutable once built; the model store hands it out behind `Arc`.
#[derive(Debug, Clone)]
pub struct BoostedModel {
    lottery_context: String,
    numbers: BTreeMap<u32, NumberModel>,
    draws_used: usize,
    trained_at: DateTime<Utc>,
}

impl BoostedModel {
    pub fn new(lottery_context: impl Into<String>, draws_used: usize) -> Self {
        Self {
            lottery_context: lottery_context.into(),
            numbers: BTreeMap::new(),
            draws_used,
            trained_at: Utc::now(),
        }
    }

    pub fn insert(&mut self, number: u32, model: NumberModel) {
        self.numbers.insert(number, model);
    }

    pub fn lottery_context(&self) -> &str {
        &self.lottery_context
    }

    pub fn draws_used(&self) -> usize {
        self.draws_used
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn get(&self, number: u32) -> Option<&NumberModel> {
        self.numbers.get(&number)
    }

    pub fn score(&self, number: u32, features: &[f64]) -> Option<f64> {
        self.numbers.get(&number)?.score(features)
    }

    pub fn base_weight(&self, number: u32) -> Option<f64> {
        self.numbers.get(&number).map(|m| m.base_weight)
    }

    pub fn tree_count(&self, number: u32) -> usize {
        self.numbers.get(&number).map_or(0, |m| m.trees.len())
    }

    pub fn total_trees(&self) -> usize {
        self.numbers.values().map(|m| m.trees.len()).sum()
    }

    pub fn numbers(&self) -> impl Iterator<Item = u32> + '_ {
        self.numbers.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}
