use lottoscope::application::ml::{BoostedEnsembleTrainer, BoostingConfig, ModelStore};
use lottoscope::domain::lottery::LotteryConfig;
use lottoscope::infrastructure::simulation::SyntheticDrawGenerator;
use std::sync::{Arc, Barrier};
use std::thread;

fn store() -> Arc<ModelStore> {
    Arc::new(ModelStore::new(BoostedEnsembleTrainer::new(BoostingConfig {
        n_estimators: 3,
        max_depth: 2,
        seed: Some(1),
        ..BoostingConfig::default()
    })))
}

#[test]
fn test_concurrent_callers_train_once_per_context() {
    let store = store();
    let config = LotteryConfig::new("quina", 5, 1, 80);
    let history = Arc::new(SyntheticDrawGenerator::new(5, 1, 80).with_seed(8).generate(260));
    let barrier = Arc::new(Barrier::new(8));

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            let config = config.clone();
            let history = history.clone();
            let barrier = barrier.clone();
            thread::spawn(move || {
                barrier.wait();
                store.get_or_create(&config, &history)
            })
        })
        .collect();

    let models: Vec<_> = handles
        .into_iter()
        .map(|h| h.join().expect("caller panicked").expect("model trained"))
        .collect();

    assert_eq!(store.training_runs(), 1);
    assert!(models.iter().all(|m| Arc::ptr_eq(m, &models[0])));
}

#[test]
fn test_contexts_are_cached_independently() {
    let store = store();
    let mega = LotteryConfig::mega_sena();
    let quina = LotteryConfig::new("quina", 5, 1, 80);
    let mega_history = SyntheticDrawGenerator::new(6, 1, 60).with_seed(1).generate(240);
    let quina_history = SyntheticDrawGenerator::new(5, 1, 80).with_seed(2).generate(240);

    let handles = [
        {
            let store = store.clone();
            thread::spawn(move || store.get_or_create(&mega, &mega_history).is_some())
        },
        {
            let store = store.clone();
            thread::spawn(move || store.get_or_create(&quina, &quina_history).is_some())
        },
    ];
    for handle in handles {
        assert!(handle.join().expect("caller panicked"));
    }

    assert_eq!(store.training_runs(), 2);
    let mut contexts = store.cached_contexts();
    contexts.sort();
    assert_eq!(contexts, vec!["megasena".to_string(), "quina".to_string()]);
}

#[test]
fn test_background_request_is_deduplicated() {
    let store = store();
    let config = LotteryConfig::mega_sena();
    let history = SyntheticDrawGenerator::new(6, 1, 60).with_seed(4).generate(230);

    let first = store.request_background_training(&config, history.clone());
    let second = store.request_background_training(&config, history);
    assert!(first.is_some());
    assert!(second.is_none());

    first.unwrap().join().unwrap();
    assert!(store.get("megasena").is_some());
    assert!(!store.is_training("megasena"));
    assert_eq!(store.training_runs(), 1);
}
