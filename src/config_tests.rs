use crate::application::strategies::TrainingMode;
use crate::config::Config;
use std::env;
use std::sync::Mutex;
use std::sync::OnceLock;

// Global lock to prevent race conditions when modifying environment variables in tests
static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn get_env_lock() -> &'static Mutex<()> {
    ENV_LOCK.get_or_init(|| Mutex::new(()))
}

const KEYS: &[&str] = &[
    "LOTTERY_CONTEXT",
    "NUMBERS_TO_DRAW",
    "MAX_NUMBER",
    "GBM_N_ESTIMATORS",
    "GBM_TRAINING_MODE",
    "ENSEMBLE_SEED",
];

fn clear_env() {
    for key in KEYS {
        // SAFETY: serialized by ENV_LOCK
        unsafe { env::remove_var(key) };
    }
}

#[test]
fn test_config_from_env_overrides() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    // SAFETY: serialized by ENV_LOCK
    unsafe {
        env::set_var("LOTTERY_CONTEXT", "lotofacil");
        env::set_var("NUMBERS_TO_DRAW", "15");
        env::set_var("MAX_NUMBER", "25");
        env::set_var("GBM_N_ESTIMATORS", "20");
        env::set_var("GBM_TRAINING_MODE", "inline");
        env::set_var("ENSEMBLE_SEED", "7");
    }

    let config = Config::from_env().unwrap();

    let lottery = config.lottery_config();
    assert_eq!(lottery.lottery_context, "lotofacil");
    assert_eq!(lottery.numbers_to_draw, 15);
    assert_eq!(lottery.max_number, 25);
    assert_eq!(config.boosting_config().n_estimators, 20);
    assert_eq!(config.training_mode(), TrainingMode::Inline);
    assert_eq!(config.ensemble.seed, Some(7));

    clear_env();
}

#[test]
fn test_config_rejects_malformed_numbers() {
    let _guard = get_env_lock().lock().unwrap_or_else(|e| e.into_inner());
    clear_env();
    // SAFETY: serialized by ENV_LOCK
    unsafe { env::set_var("NUMBERS_TO_DRAW", "six") };

    let err = Config::from_env().unwrap_err();
    assert!(format!("{:#}", err).contains("NUMBERS_TO_DRAW"));

    clear_env();
}
