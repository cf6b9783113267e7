use lottoscope::application::ml::{BoostedEnsembleTrainer, BoostingConfig, ModelStore};
use lottoscope::application::strategies::{
    EnsembleStrategy, FrequencyStrategy, PredictionStrategy, StrategyRegistry, TrainingMode,
    TrendStrategy,
};
use lottoscope::domain::errors::PredictionError;
use lottoscope::domain::lottery::{Draw, LotteryConfig, is_valid_selection};
use lottoscope::infrastructure::simulation::SyntheticDrawGenerator;
use std::collections::HashSet;
use std::sync::Arc;

fn quick_store() -> Arc<ModelStore> {
    let config = BoostingConfig {
        n_estimators: 5,
        max_depth: 3,
        seed: Some(11),
        ..BoostingConfig::default()
    };
    Arc::new(ModelStore::new(BoostedEnsembleTrainer::new(config)))
}

fn history(count: usize) -> Vec<Draw> {
    SyntheticDrawGenerator::new(6, 1, 60)
        .with_seed(2024)
        .generate(count)
}

struct BrokenStrategy;

impl PredictionStrategy for BrokenStrategy {
    fn predict(&self, _: &[Draw], _: &LotteryConfig) -> Result<Vec<u32>, PredictionError> {
        Err(PredictionError::strategy("broken", "always fails"))
    }

    fn name(&self) -> &str {
        "broken"
    }
}

#[test]
fn test_full_ensemble_trains_once_and_predicts() {
    let config = LotteryConfig::mega_sena();
    let draws = history(600);
    let store = quick_store();
    let ensemble = EnsembleStrategy::new(StrategyRegistry::standard(
        store.clone(),
        TrainingMode::Inline,
    ))
    .with_seed(7);

    let numbers = ensemble.predict(&draws, &config).unwrap();
    assert!(is_valid_selection(&numbers, &config));
    assert_eq!(store.training_runs(), 1);
    assert!(store.get("megasena").is_some());

    // Second call reuses the cached model
    let again = ensemble.predict(&draws, &config).unwrap();
    assert_eq!(again, numbers);
    assert_eq!(store.training_runs(), 1);
}

#[test]
fn test_diversified_games_are_distinct_and_led_by_consensus() {
    let config = LotteryConfig::mega_sena();
    let draws = history(300);
    let ensemble = EnsembleStrategy::new(StrategyRegistry::standard(
        quick_store(),
        TrainingMode::Inline,
    ))
    .with_seed(99);

    let consensus = ensemble.predict_with_consensus(&draws, &config).unwrap();
    let set = ensemble.predict_diversified(&draws, &config, 5).unwrap();

    assert_eq!(set.games.len(), 5);
    assert_eq!(set.games[0], consensus.numbers);
    let unique: HashSet<&Vec<u32>> = set.games.iter().collect();
    assert_eq!(unique.len(), 5);
    assert!(set.games.iter().all(|g| is_valid_selection(g, &config)));
}

#[test]
fn test_single_strategy_ensemble_reproduces_it() {
    let config = LotteryConfig::mega_sena();
    let draws = history(150);
    let frequency = FrequencyStrategy::default();
    let ensemble = EnsembleStrategy::new(
        StrategyRegistry::builder()
            .register(Arc::new(FrequencyStrategy::default()))
            .build(),
    );

    assert_eq!(
        ensemble.predict(&draws, &config).unwrap(),
        frequency.predict(&draws, &config).unwrap()
    );
}

#[test]
fn test_seeded_ensembles_agree() {
    let config = LotteryConfig::mega_sena();
    let draws = history(120);
    let build = || {
        EnsembleStrategy::new(
            StrategyRegistry::builder()
                .register(Arc::new(FrequencyStrategy::default()))
                .register(Arc::new(TrendStrategy))
                .build(),
        )
        .with_seed(5)
    };

    assert_eq!(
        build().predict_diversified(&draws, &config, 4).unwrap(),
        build().predict_diversified(&draws, &config, 4).unwrap()
    );
}

#[test]
fn test_failing_strategy_is_excluded() {
    let config = LotteryConfig::mega_sena();
    let draws = history(100);
    let ensemble = EnsembleStrategy::new(
        StrategyRegistry::builder()
            .register(Arc::new(TrendStrategy))
            .register(Arc::new(BrokenStrategy))
            .build(),
    );

    let result = ensemble.predict_with_consensus(&draws, &config).unwrap();
    assert!(!result.degraded);
    assert_eq!(result.failed_strategies, vec!["broken".to_string()]);
    assert_eq!(result.participants, 1);
    assert_eq!(result.numbers, TrendStrategy.predict(&draws, &config).unwrap());
}

#[test]
fn test_all_strategies_failing_falls_back_to_random_sample() {
    let config = LotteryConfig::mega_sena();
    let ensemble = EnsembleStrategy::new(
        StrategyRegistry::builder()
            .register(Arc::new(BrokenStrategy))
            .build(),
    )
    .with_seed(3);

    let result = ensemble.predict_with_consensus(&history(30), &config).unwrap();
    assert!(result.degraded);
    assert_eq!(result.participants, 0);
    assert!(is_valid_selection(&result.numbers, &config));
}

#[test]
fn test_short_history_uses_heuristic_scoring() {
    let config = LotteryConfig::mega_sena();
    let store = quick_store();
    let ensemble = EnsembleStrategy::new(StrategyRegistry::standard(
        store.clone(),
        TrainingMode::Inline,
    ));

    let numbers = ensemble.predict(&history(150), &config).unwrap();
    assert!(is_valid_selection(&numbers, &config));
    assert_eq!(store.training_runs(), 0);
}
