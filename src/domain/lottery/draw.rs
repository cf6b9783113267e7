use crate::domain::errors::PredictionError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// One recorded lottery outcome.
///
/// Numbers are kept sorted ascending and duplicate-free so membership checks
/// can binary search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draw {
    pub concurso: u32,
    pub date: NaiveDate,
    numbers: Vec<u32>,
}

impl Draw {
    pub fn new(concurso: u32, date: NaiveDate, mut numbers: Vec<u32>) -> Self {
        numbers.sort_unstable();
        numbers.dedup();
        Self {
            concurso,
            date,
            numbers,
        }
    }

    pub fn numbers(&self) -> &[u32] {
        &self.numbers
    }

    pub fn contains(&self, number: u32) -> bool {
        self.numbers.binary_search(&number).is_ok()
    }
}

impl fmt::Display for Draw {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let numbers: Vec<String> = self.numbers.iter().map(|n| format!("{:02}", n)).collect();
        write!(f, "#{} ({}): {}", self.concurso, self.date, numbers.join(" "))
    }
}

/// Shape of the game being predicted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LotteryConfig {
    pub numbers_to_draw: usize,
    pub min_number: u32,
    pub max_number: u32,
    /// Key for model caching and weight lookup (e.g. "megasena")
    pub lottery_context: String,
}

impl LotteryConfig {
    pub fn new(
        lottery_context: impl Into<String>,
        numbers_to_draw: usize,
        min_number: u32,
        max_number: u32,
    ) -> Self {
        Self {
            numbers_to_draw,
            min_number,
            max_number,
            lottery_context: lottery_context.into(),
        }
    }

    /// Mega-Sena: 6 numbers out of 1..=60
    pub fn mega_sena() -> Self {
        Self::new("megasena", 6, 1, 60)
    }

    pub fn numbers(&self) -> RangeInclusive<u32> {
        self.min_number..=self.max_number
    }

    pub fn range_size(&self) -> usize {
        if self.max_number < self.min_number {
            return 0;
        }
        (self.max_number - self.min_number) as usize + 1
    }

    pub fn contains(&self, number: u32) -> bool {
        self.numbers().contains(&number)
    }

    /// True when `draw` has the configured size and every number is in range.
    pub fn fits(&self, draw: &Draw) -> bool {
        draw.numbers().len() == self.numbers_to_draw
            && draw.numbers().iter().all(|&n| self.contains(n))
    }

    /// Structural checks shared by every prediction entry point.
    pub fn validate(&self, history: &[Draw]) -> Result<(), PredictionError> {
        if self.min_number > self.max_number {
            return Err(PredictionError::invalid(format!(
                "min_number {} is greater than max_number {}",
                self.min_number, self.max_number
            )));
        }
        if self.numbers_to_draw == 0 {
            return Err(PredictionError::invalid("numbers_to_draw must be at least 1"));
        }
        if self.numbers_to_draw > self.range_size() {
            return Err(PredictionError::invalid(format!(
                "numbers_to_draw {} exceeds range size {} ([{}, {}])",
                self.numbers_to_draw,
                self.range_size(),
                self.min_number,
                self.max_number
            )));
        }
        if history.is_empty() {
            return Err(PredictionError::invalid("history is empty"));
        }
        Ok(())
    }
}

impl Default for LotteryConfig {
    fn default() -> Self {
        Self::mega_sena()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 2).unwrap_or_default()
    }

    #[test]
    fn test_draw_normalizes_numbers() {
        let draw = Draw::new(2700, date(), vec![42, 5, 17, 5, 60, 1]);
        assert_eq!(draw.numbers(), &[1, 5, 17, 42, 60]);
        assert!(draw.contains(17));
        assert!(!draw.contains(18));
    }

    #[test]
    fn test_draw_display() {
        let draw = Draw::new(12, date(), vec![3, 1]);
        assert_eq!(draw.to_string(), "#12 (2024-03-02): 01 03");
    }

    #[test]
    fn test_validate_rejects_oversized_selection() {
        let config = LotteryConfig::new("tiny", 7, 1, 6);
        let history = vec![Draw::new(1, date(), vec![1, 2])];

        let err = config.validate(&history).unwrap_err();
        assert!(matches!(err, PredictionError::InvalidConfiguration { .. }));
    }

    #[test]
    fn test_validate_rejects_empty_history() {
        let config = LotteryConfig::mega_sena();
        assert!(config.validate(&[]).is_err());
    }

    #[test]
    fn test_validate_rejects_inverted_range() {
        let config = LotteryConfig::new("broken", 1, 10, 1);
        let history = vec![Draw::new(1, date(), vec![1])];
        assert!(config.validate(&history).is_err());
        assert_eq!(config.range_size(), 0);
    }

    #[test]
    fn test_validate_accepts_full_range_selection() {
        let config = LotteryConfig::new("full", 6, 1, 6);
        let history = vec![Draw::new(1, date(), vec![1, 2])];
        assert!(config.validate(&history).is_ok());
    }
}
