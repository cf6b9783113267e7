//! Binary regression trees grown by greedy variance reduction.
//!
//! Each split node exclusively owns its two children, so a tree is a plain
//! recursive value: built once, read-only afterwards, cheap to share behind `Arc`.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Gains at or below this are treated as "no improvement".
pub const MIN_SPLIT_GAIN: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_split: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            min_samples_split: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DecisionTree {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<DecisionTree>,
        right: Box<DecisionTree>,
    },
}

#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    gain: f64,
}

impl DecisionTree {
    /// Grows a tree on rows `x` with targets `y`.
    pub fn build<R: AsRef<[f64]>>(x: &[R], y: &[f64], config: &TreeConfig) -> Self {
        let rows = x.len().min(y.len());
        let indices: Vec<usize> = (0..rows).collect();
        Self::grow(x, y, &indices, 0, config)
    }

    fn grow<R: AsRef<[f64]>>(
        x: &[R],
        y: &[f64],
        indices: &[usize],
        depth: usize,
        config: &TreeConfig,
    ) -> Self {
        let leaf = || DecisionTree::Leaf {
            value: mean_of(y, indices),
        };

        if depth >= config.max_depth || indices.len() < config.min_samples_split {
            return leaf();
        }

        let Some(split) = best_split(x, y, indices) else {
            return leaf();
        };

        let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&row| x[row].as_ref()[split.feature] <= split.threshold);

        // Midpoint rounding can collapse two adjacent floats onto one side
        if left_rows.is_empty() || right_rows.is_empty() {
            return leaf();
        }

        DecisionTree::Split {
            feature: split.feature,
            threshold: split.threshold,
            left: Box::new(Self::grow(x, y, &left_rows, depth + 1, config)),
            right: Box::new(Self::grow(x, y, &right_rows, depth + 1, config)),
        }
    }

    /// Routes `features` to a leaf (`value <= threshold` goes left).
    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut node = self;
        loop {
            match node {
                DecisionTree::Leaf { value } => return *value,
                DecisionTree::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let value = features.get(*feature).copied().unwrap_or(0.0);
                    node = if value <= *threshold { left } else { right };
                }
            }
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, DecisionTree::Leaf { .. })
    }

    /// Depth of the deepest leaf (a lone leaf has depth 0).
    pub fn depth(&self) -> usize {
        match self {
            DecisionTree::Leaf { .. } => 0,
            DecisionTree::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    pub fn leaf_count(&self) -> usize {
        match self {
            DecisionTree::Leaf { .. } => 1,
            DecisionTree::Split { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }
}

fn mean_of(y: &[f64], indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64
}

fn variance_from_sums(sum: f64, sum_sq: f64, n: f64) -> f64 {
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0)
}

/// Scans every feature for the midpoint threshold with the largest variance reduction.
///
/// Per feature the rows are sorted once and swept with running sums, which
/// scores exactly the candidates an exhaustive midpoint scan would. Features
/// are visited in order and thresholds ascending; the first maximum wins.
fn best_split<R: AsRef<[f64]>>(x: &[R], y: &[f64], indices: &[usize]) -> Option<SplitCandidate> {
    let n = indices.len();
    if n < 2 {
        return None;
    }

    let parent_variance = indices.iter().map(|&i| y[i]).population_variance();
    if !(parent_variance > MIN_SPLIT_GAIN) {
        return None;
    }

    let n_f = n as f64;
    let total_sum: f64 = indices.iter().map(|&i| y[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| y[i] * y[i]).sum();
    let n_features = x[indices[0]].as_ref().len();

    let mut best: Option<SplitCandidate> = None;
    let mut order = indices.to_vec();

    for feature in 0..n_features {
        order.sort_by(|&a, &b| x[a].as_ref()[feature].total_cmp(&x[b].as_ref()[feature]));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;

        for pos in 0..n - 1 {
            let row = order[pos];
            left_sum += y[row];
            left_sq += y[row] * y[row];

            let value = x[row].as_ref()[feature];
            let next = x[order[pos + 1]].as_ref()[feature];
            if value == next {
                continue;
            }

            let left_n = (pos + 1) as f64;
            let right_n = n_f - left_n;
            let left_var = variance_from_sums(left_sum, left_sq, left_n);
            let right_var = variance_from_sums(total_sum - left_sum, total_sq - left_sq, right_n);
            let gain = parent_variance - (left_n * left_var + right_n * right_var) / n_f;

            if best.is_none_or(|b| gain > b.gain) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: (value + next) / 2.0,
                    gain,
                });
            }
        }
    }

    best.filter(|b| b.gain > MIN_SPLIT_GAIN)
}
