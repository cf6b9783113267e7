use crate::domain::lottery::Draw;
use chrono::{Duration, NaiveDate};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index;

/// Days between consecutive generated draws
const DRAW_INTERVAL_DAYS: i64 = 3;

/// Uniform random draw history, for offline runs and tests.
#[derive(Debug, Clone)]
pub struct SyntheticDrawGenerator {
    numbers_per_draw: usize,
    min_number: u32,
    max_number: u32,
    seed: Option<u64>,
    first_date: NaiveDate,
}

impl SyntheticDrawGenerator {
    pub fn new(numbers_per_draw: usize, min_number: u32, max_number: u32) -> Self {
        Self {
            numbers_per_draw,
            min_number,
            max_number: max_number.max(min_number),
            seed: None,
            first_date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default(),
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Generates `count` draws, most recent first; concurso runs from `count` down to 1.
    pub fn generate(&self, count: usize) -> Vec<Draw> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let range = (self.max_number - self.min_number) as usize + 1;
        let amount = self.numbers_per_draw.min(range);

        let mut draws: Vec<Draw> = (0..count)
            .map(|i| {
                let numbers = index::sample(&mut rng, range, amount)
                    .into_iter()
                    .map(|offset| self.min_number + offset as u32)
                    .collect();
                let date = self.first_date + Duration::days(i as i64 * DRAW_INTERVAL_DAYS);
                Draw::new(i as u32 + 1, date, numbers)
            })
            .collect();
        draws.reverse();
        draws
    }
}
