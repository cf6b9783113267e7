use crate::domain::lottery::Draw;

/// Ordered list of feature names.
/// Trees address features by index, so any reordering here invalidates cached models.
pub const FEATURE_NAMES: &[&str] = &[
    "frequency",
    "current_gap",
    "average_gap",
    "gap_ratio",
    "trend",
    "parity",
    "magnitude",
    "decade_bucket",
    "in_last_draw",
    "last5_frequency",
];

pub const FEATURE_COUNT: usize = 10;

pub const FREQUENCY: usize = 0;
pub const CURRENT_GAP: usize = 1;
pub const AVERAGE_GAP: usize = 2;
pub const GAP_RATIO: usize = 3;
pub const TREND: usize = 4;
pub const PARITY: usize = 5;

pub const DEFAULT_WINDOW_SIZE: usize = 50;

/// Substituted for the gap ratio when the average gap is zero.
pub const NEUTRAL_GAP_RATIO: f64 = 1.0;

const TREND_SPAN: usize = 10;
const LAST_DRAWS_SPAN: usize = 5;

pub type FeatureVector = [f64; FEATURE_COUNT];

/// Turns a candidate number plus a most-recent-first draw window into a feature vector.
#[derive(Debug, Clone, Copy)]
pub struct FeatureExtractor {
    window_size: usize,
    max_number: u32,
}

impl FeatureExtractor {
    pub fn new(window_size: usize, max_number: u32) -> Self {
        Self {
            window_size: window_size.max(1),
            max_number: max_number.max(1),
        }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Extracts the 10 features for `number`.
    ///
    /// `history[0]` is the most recent draw. An empty history yields the
    /// "never seen" vector; callers reject empty history before getting here.
    pub fn extract(&self, number: u32, history: &[Draw]) -> FeatureVector {
        let window = &history[..history.len().min(self.window_size)];
        let window_size = self.window_size as f64;

        let occurrences: Vec<usize> = window
            .iter()
            .enumerate()
            .filter(|(_, draw)| draw.contains(number))
            .map(|(idx, _)| idx)
            .collect();

        let frequency = occurrences.len() as f64 / window_size;

        let current_gap = occurrences
            .first()
            .map(|&idx| idx as f64)
            .unwrap_or(window_size);

        let average_gap = if occurrences.len() < 2 {
            window_size
        } else {
            let total: usize = occurrences.windows(2).map(|w| w[1] - w[0]).sum();
            total as f64 / (occurrences.len() - 1) as f64
        };

        let gap_ratio = if average_gap > 0.0 {
            current_gap / average_gap
        } else {
            NEUTRAL_GAP_RATIO
        };

        let recent_hits = hits_between(history, number, 0, TREND_SPAN);
        let older_hits = hits_between(history, number, TREND_SPAN, 2 * TREND_SPAN);
        let trend = (recent_hits as f64 - older_hits as f64 + TREND_SPAN as f64)
            / (2 * TREND_SPAN) as f64;

        let in_last_draw = history
            .first()
            .map(|draw| if draw.contains(number) { 1.0 } else { 0.0 })
            .unwrap_or(0.0);

        let last5_frequency =
            hits_between(history, number, 0, LAST_DRAWS_SPAN) as f64 / LAST_DRAWS_SPAN as f64;

        [
            frequency,
            current_gap / window_size,
            average_gap / window_size,
            gap_ratio,
            trend,
            (number % 2) as f64,
            number as f64 / self.max_number as f64,
            (number / 10) as f64 / 6.0,
            in_last_draw,
            last5_frequency,
        ]
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_SIZE, 60)
    }
}

fn hits_between(history: &[Draw], number: u32, start: usize, end: usize) -> usize {
    history
        .iter()
        .skip(start)
        .take(end.saturating_sub(start))
        .filter(|draw| draw.contains(number))
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draws(numbers: &[&[u32]]) -> Vec<Draw> {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default();
        numbers
            .iter()
            .enumerate()
            .map(|(i, nums)| Draw::new(1000 - i as u32, date, nums.to_vec()))
            .collect()
    }

    #[test]
    fn test_feature_vector_length() {
        assert_eq!(FEATURE_NAMES.len(), FEATURE_COUNT);
        let history = draws(&[&[1, 2, 3]]);
        let features = FeatureExtractor::default().extract(7, &history);
        assert_eq!(features.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_gap_features() {
        // 5 appears at indices 1, 3 and 7 of a 10-draw window
        let mut rows: Vec<&[u32]> = vec![&[1]; 10];
        rows[1] = &[5];
        rows[3] = &[5];
        rows[7] = &[5];
        let history = draws(&rows);
        let extractor = FeatureExtractor::new(10, 60);

        let f = extractor.extract(5, &history);
        assert!((f[FREQUENCY] - 0.3).abs() < 1e-12);
        assert!((f[CURRENT_GAP] - 0.1).abs() < 1e-12);
        // gaps 2 and 4 -> average 3
        assert!((f[AVERAGE_GAP] - 0.3).abs() < 1e-12);
        assert!((f[GAP_RATIO] - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_absent_number_uses_window_size() {
        let history = draws(&[&[1, 2], &[3, 4]]);
        let extractor = FeatureExtractor::new(50, 60);

        let f = extractor.extract(9, &history);
        assert_eq!(f[FREQUENCY], 0.0);
        assert_eq!(f[CURRENT_GAP], 1.0);
        assert_eq!(f[AVERAGE_GAP], 1.0);
        assert_eq!(f[GAP_RATIO], 1.0);
        assert_eq!(f[8], 0.0);
    }

    #[test]
    fn test_trend_compares_recent_and_older_blocks() {
        let mut rows: Vec<&[u32]> = vec![&[1]; 20];
        for row in rows.iter_mut().take(4) {
            *row = &[8];
        }
        let history = draws(&rows);

        let f = FeatureExtractor::default().extract(8, &history);
        // (4 - 0 + 10) / 20
        assert!((f[TREND] - 0.7).abs() < 1e-12);
        assert!((f[9] - 0.8).abs() < 1e-12);
        assert_eq!(f[8], 1.0);
    }

    #[test]
    fn test_static_features() {
        let history = draws(&[&[1]]);
        let f = FeatureExtractor::new(50, 60).extract(37, &history);
        assert_eq!(f[PARITY], 1.0);
        assert!((f[6] - 37.0 / 60.0).abs() < 1e-12);
        assert!((f[7] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_features_are_finite_and_bounded() {
        let history = draws(&[&[1, 2, 3], &[2, 3, 4], &[3, 4, 5], &[10, 20, 30]]);
        let extractor = FeatureExtractor::new(50, 60);

        for number in 1..=60 {
            let f = extractor.extract(number, &history);
            assert!(f.iter().all(|v| v.is_finite()));
            assert!(f[PARITY] == 0.0 || f[PARITY] == 1.0);
            assert!(f[GAP_RATIO] >= 0.0);
            for (idx, value) in f.iter().enumerate() {
                if idx != GAP_RATIO {
                    assert!((0.0..=1.0).contains(value), "feature {} = {}", idx, value);
                }
            }
        }
    }

    #[test]
    fn test_empty_history_does_not_panic() {
        let f = FeatureExtractor::default().extract(4, &[]);
        assert_eq!(f[FREQUENCY], 0.0);
        assert_eq!(f[TREND], 0.5);
    }
}
