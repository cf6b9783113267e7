use super::draw::LotteryConfig;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Output of one strategy inside an ensemble round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyPrediction {
    pub strategy: String,
    /// Ascending, duplicate-free, `numbers_to_draw` long
    pub numbers: Vec<u32>,
    pub weight: f64,
}

/// Orders scored numbers by descending score, breaking ties by ascending number.
pub fn rank_scores(scores: &mut [(u32, f64)]) {
    scores.sort_by(|a, b| match b.1.total_cmp(&a.1) {
        Ordering::Equal => a.0.cmp(&b.0),
        other => other,
    });
}

/// Picks the `k` best scored numbers and returns them ascending.
pub fn select_top(mut scores: Vec<(u32, f64)>, k: usize) -> Vec<u32> {
    rank_scores(&mut scores);
    let mut selected: Vec<u32> = scores.into_iter().take(k).map(|(n, _)| n).collect();
    selected.sort_unstable();
    selected
}

/// True when `numbers` is strictly ascending, in range, and `numbers_to_draw` long.
pub fn is_valid_selection(numbers: &[u32], config: &LotteryConfig) -> bool {
    numbers.len() == config.numbers_to_draw
        && numbers.iter().all(|&n| config.contains(n))
        && numbers.windows(2).all(|w| w[0] < w[1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_top_breaks_ties_by_number() {
        let scores = vec![(9, 0.5), (3, 0.9), (7, 0.5), (1, 0.5), (4, 0.1)];
        assert_eq!(select_top(scores, 3), vec![1, 3, 7]);
    }

    #[test]
    fn test_select_top_returns_ascending() {
        let scores = vec![(10, 0.1), (2, 0.2), (8, 0.3)];
        assert_eq!(select_top(scores, 2), vec![2, 8]);
    }

    #[test]
    fn test_is_valid_selection() {
        let config = LotteryConfig::new("test", 3, 1, 10);
        assert!(is_valid_selection(&[1, 5, 10], &config));
        assert!(!is_valid_selection(&[1, 5], &config));
        assert!(!is_valid_selection(&[5, 1, 10], &config));
        assert!(!is_valid_selection(&[1, 1, 10], &config));
        assert!(!is_valid_selection(&[0, 5, 10], &config));
        assert!(!is_valid_selection(&[1, 5, 11], &config));
    }
}
