use super::registry::StrategyRegistry;
use super::traits::PredictionStrategy;
use crate::domain::errors::PredictionError;
use crate::domain::lottery::{
    Draw, LotteryConfig, StrategyPrediction, is_valid_selection, rank_scores,
};
use crate::domain::performance::DEFAULT_STRATEGY_WEIGHT;
use crate::infrastructure::observability::Metrics;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::{debug, info, warn};

pub const DEFAULT_GAME_COUNT: usize = 5;

/// Strategies reported in `EnsembleResult::top_contributors`
pub const TOP_CONTRIBUTORS: usize = 5;

/// Attempts per game slot before variation search gives up
pub const VARIATION_ATTEMPTS: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyContribution {
    pub strategy: String,
    /// How many of the final numbers this strategy proposed
    pub matched: usize,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleResult {
    pub numbers: Vec<u32>,
    /// Mean agreement over the selected numbers, 0-100
    pub consensus_pct: f64,
    /// Share of participating strategies that proposed each selected number, 0-100
    pub agreement: BTreeMap<u32, f64>,
    pub top_contributors: Vec<StrategyContribution>,
    pub participants: usize,
    pub failed_strategies: Vec<String>,
    /// True when no strategy succeeded and the numbers are a random sample
    pub degraded: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiversifiedSet {
    /// Pairwise distinct, each ascending
    pub games: Vec<Vec<u32>>,
    pub requested: usize,
    /// True when the consensus game was a random fallback or fewer games than requested were found
    pub degraded: bool,
}

/// Outputs of one pass over the registry
struct Round {
    predictions: Vec<StrategyPrediction>,
    failed: Vec<String>,
}

/// Weighted positional vote over every registered strategy.
///
/// A strategy contributes `weight * (L - p) / L` to the number at position `p`
/// of its `L`-long output; votes are normalized by the sum of participating
/// weights and the best `numbers_to_draw` win, ties going to the lower number.
#[derive(Clone)]
pub struct EnsembleStrategy {
    registry: StrategyRegistry,
    weights: HashMap<String, f64>,
    default_weight: f64,
    seed: Option<u64>,
    metrics: Option<Metrics>,
}

impl EnsembleStrategy {
    pub const NAME: &'static str = "ensemble";

    pub fn new(registry: StrategyRegistry) -> Self {
        Self {
            registry,
            weights: HashMap::new(),
            default_weight: DEFAULT_STRATEGY_WEIGHT,
            seed: None,
            metrics: None,
        }
    }

    /// Per-strategy voting weights keyed by strategy name
    pub fn with_weights(mut self, weights: HashMap<String, f64>) -> Self {
        self.weights = weights;
        self
    }

    /// Weight for strategies missing from the weight map
    pub fn with_default_weight(mut self, weight: f64) -> Self {
        self.default_weight = weight.max(0.0);
        self
    }

    /// Fixes the random source used by the fallback sample and game variations
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn weight_for(&self, name: &str) -> f64 {
        self.weights
            .get(name)
            .copied()
            .filter(|w| w.is_finite())
            .unwrap_or(self.default_weight)
            .max(0.0)
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }

    /// Runs every registered strategy except the ensemble itself, in parallel.
    /// Failures and malformed outputs are logged and left out of the round.
    fn collect_predictions(&self, history: &[Draw], config: &LotteryConfig) -> Round {
        let participants: Vec<_> = self
            .registry
            .iter()
            .filter(|s| s.name() != Self::NAME)
            .collect();

        let outcomes: Vec<(String, Result<Vec<u32>, PredictionError>)> = participants
            .par_iter()
            .map(|strategy| {
                (
                    strategy.name().to_string(),
                    strategy.predict(history, config),
                )
            })
            .collect();

        let mut round = Round {
            predictions: Vec::with_capacity(outcomes.len()),
            failed: Vec::new(),
        };

        for (name, outcome) in outcomes {
            match outcome {
                Ok(numbers) if is_valid_selection(&numbers, config) => {
                    let weight = self.weight_for(&name);
                    debug!("Ensemble: {} (w={:.3}) -> {:?}", name, weight, numbers);
                    round.predictions.push(StrategyPrediction {
                        strategy: name,
                        numbers,
                        weight,
                    });
                }
                Ok(numbers) => {
                    warn!(
                        "Ensemble: strategy {} returned an invalid selection {:?}, excluded",
                        name, numbers
                    );
                    self.record_failure(&name);
                    round.failed.push(name);
                }
                Err(e) => {
                    warn!("Ensemble: strategy {} failed: {}", name, e);
                    self.record_failure(&name);
                    round.failed.push(name);
                }
            }
        }
        round
    }

    /// Normalized positional votes for every number in range
    fn tally(predictions: &[StrategyPrediction], config: &LotteryConfig) -> Vec<(u32, f64)> {
        let mut votes: BTreeMap<u32, f64> = config.numbers().map(|n| (n, 0.0)).collect();
        let mut total_weight = 0.0;

        for prediction in predictions {
            total_weight += prediction.weight;
            let len = prediction.numbers.len() as f64;
            for (position, number) in prediction.numbers.iter().enumerate() {
                if let Some(vote) = votes.get_mut(number) {
                    *vote += prediction.weight * (len - position as f64) / len;
                }
            }
        }

        // All-zero weights: votes stay 0 and ties fall back to the lowest numbers
        if total_weight > 0.0 {
            for vote in votes.values_mut() {
                *vote /= total_weight;
            }
        }
        votes.into_iter().collect()
    }

    fn random_selection(config: &LotteryConfig, rng: &mut StdRng) -> Vec<u32> {
        let mut numbers: Vec<u32> = index::sample(rng, config.range_size(), config.numbers_to_draw)
            .into_iter()
            .map(|offset| config.min_number + offset as u32)
            .collect();
        numbers.sort_unstable();
        numbers
    }

    fn consensus(&self, round: &Round, config: &LotteryConfig, rng: &mut StdRng) -> EnsembleResult {
        if round.predictions.is_empty() {
            warn!(
                "Ensemble: no strategy produced a selection for {} ({} failed), using random sample",
                config.lottery_context,
                round.failed.len()
            );
            if let Some(metrics) = &self.metrics {
                metrics.inc_degraded("no_strategies");
            }
            return EnsembleResult {
                numbers: Self::random_selection(config, rng),
                consensus_pct: 0.0,
                agreement: BTreeMap::new(),
                top_contributors: Vec::new(),
                participants: 0,
                failed_strategies: round.failed.clone(),
                degraded: true,
            };
        }

        let mut votes = Self::tally(&round.predictions, config);
        rank_scores(&mut votes);
        let mut numbers: Vec<u32> = votes
            .into_iter()
            .take(config.numbers_to_draw)
            .map(|(n, _)| n)
            .collect();
        numbers.sort_unstable();

        let participants = round.predictions.len();
        let agreement: BTreeMap<u32, f64> = numbers
            .iter()
            .map(|&n| {
                let proposers = round
                    .predictions
                    .iter()
                    .filter(|p| p.numbers.binary_search(&n).is_ok())
                    .count();
                (n, proposers as f64 / participants as f64 * 100.0)
            })
            .collect();
        let consensus_pct = agreement.values().sum::<f64>() / numbers.len() as f64;

        let mut top_contributors: Vec<StrategyContribution> = round
            .predictions
            .iter()
            .map(|p| StrategyContribution {
                strategy: p.strategy.clone(),
                matched: p
                    .numbers
                    .iter()
                    .filter(|n| numbers.binary_search(n).is_ok())
                    .count(),
                weight: p.weight,
            })
            .collect();
        top_contributors.sort_by(|a, b| {
            b.matched
                .cmp(&a.matched)
                .then_with(|| b.weight.total_cmp(&a.weight))
                .then_with(|| a.strategy.cmp(&b.strategy))
        });
        top_contributors.truncate(TOP_CONTRIBUTORS);

        EnsembleResult {
            numbers,
            consensus_pct,
            agreement,
            top_contributors,
            participants,
            failed_strategies: round.failed.clone(),
            degraded: false,
        }
    }

    /// Each participating strategy's own selection, failures excluded.
    ///
    /// Every strategy is prepared first, so deferred model training has finished
    /// before the selections are made.
    pub fn strategy_predictions(
        &self,
        history: &[Draw],
        config: &LotteryConfig,
    ) -> Result<Vec<StrategyPrediction>, PredictionError> {
        config.validate(history)?;
        self.registry
            .iter()
            .filter(|s| s.name() != Self::NAME)
            .collect::<Vec<_>>()
            .par_iter()
            .for_each(|strategy| strategy.prepare(history, config));
        Ok(self.collect_predictions(history, config).predictions)
    }

    /// Final selection plus agreement statistics.
    pub fn predict_with_consensus(
        &self,
        history: &[Draw],
        config: &LotteryConfig,
    ) -> Result<EnsembleResult, PredictionError> {
        config.validate(history)?;
        let round = self.collect_predictions(history, config);
        let result = self.consensus(&round, config, &mut self.rng());

        info!(
            "Ensemble: {} -> {:?} (consensus {:.1}%, {} strategies, {} failed)",
            config.lottery_context,
            result.numbers,
            result.consensus_pct,
            result.participants,
            result.failed_strategies.len()
        );
        Ok(result)
    }

    /// Up to `game_count` pairwise distinct games.
    ///
    /// The consensus game comes first, then individual strategy outputs by
    /// descending weight, then random 1-2 number variations of the consensus
    /// game. Each variation slot gets `VARIATION_ATTEMPTS` tries; running out
    /// returns fewer games and marks the set degraded.
    pub fn predict_diversified(
        &self,
        history: &[Draw],
        config: &LotteryConfig,
        game_count: usize,
    ) -> Result<DiversifiedSet, PredictionError> {
        config.validate(history)?;
        let mut rng = self.rng();
        let round = self.collect_predictions(history, config);
        let consensus = self.consensus(&round, config, &mut rng);

        let mut games: Vec<Vec<u32>> = Vec::with_capacity(game_count);
        let mut seen: HashSet<Vec<u32>> = HashSet::new();

        if game_count > 0 {
            seen.insert(consensus.numbers.clone());
            games.push(consensus.numbers.clone());
        }

        let mut by_weight: Vec<&StrategyPrediction> = round.predictions.iter().collect();
        by_weight.sort_by(|a, b| b.weight.total_cmp(&a.weight));
        for prediction in by_weight {
            if games.len() >= game_count {
                break;
            }
            if seen.insert(prediction.numbers.clone()) {
                games.push(prediction.numbers.clone());
            }
        }

        while games.len() < game_count {
            let found = (0..VARIATION_ATTEMPTS).find_map(|_| {
                let candidate = Self::vary(&consensus.numbers, config, &mut rng)?;
                seen.insert(candidate.clone()).then_some(candidate)
            });
            match found {
                Some(game) => games.push(game),
                None => {
                    warn!(
                        "Ensemble: variation budget exhausted for {}, returning {} of {} games",
                        config.lottery_context,
                        games.len(),
                        game_count
                    );
                    if let Some(metrics) = &self.metrics {
                        metrics.inc_degraded("diversification_exhausted");
                    }
                    break;
                }
            }
        }

        let degraded = consensus.degraded || games.len() < game_count;
        info!(
            "Ensemble: {} diversified into {} games{}",
            config.lottery_context,
            games.len(),
            if degraded { " (degraded)" } else { "" }
        );

        Ok(DiversifiedSet {
            games,
            requested: game_count,
            degraded,
        })
    }

    /// Replaces 1-2 numbers of `base` with numbers it does not contain.
    /// `None` when the range has no spare numbers.
    fn vary(base: &[u32], config: &LotteryConfig, rng: &mut StdRng) -> Option<Vec<u32>> {
        let spare: Vec<u32> = config
            .numbers()
            .filter(|n| base.binary_search(n).is_err())
            .collect();
        let replace = rng
            .random_range(1..=2usize)
            .min(base.len())
            .min(spare.len());
        if replace == 0 {
            return None;
        }

        let mut game = base.to_vec();
        let positions = index::sample(rng, base.len(), replace).into_vec();
        let picks = index::sample(rng, spare.len(), replace).into_vec();
        for (position, pick) in positions.into_iter().zip(picks) {
            game[position] = spare[pick];
        }
        game.sort_unstable();
        Some(game)
    }

    fn record_failure(&self, strategy: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.inc_strategy_failure(strategy);
        }
    }
}

impl PredictionStrategy for EnsembleStrategy {
    fn predict(
        &self,
        history: &[Draw],
        config: &LotteryConfig,
    ) -> Result<Vec<u32>, PredictionError> {
        self.predict_with_consensus(history, config)
            .map(|result| result.numbers)
    }

    fn name(&self) -> &str {
        Self::NAME
    }
}

// Implement Debug manually since Arc<dyn PredictionStrategy> doesn't impl Debug
impl std::fmt::Debug for EnsembleStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnsembleStrategy")
            .field("registry", &self.registry)
            .field("weights", &self.weights)
            .field("default_weight", &self.default_weight)
            .field("seed", &self.seed)
            .finish()
    }
}
