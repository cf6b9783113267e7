use super::trainer::BoostedEnsembleTrainer;
use crate::domain::lottery::{Draw, LotteryConfig};
use crate::domain::ml::BoostedModel;
use crate::infrastructure::observability::Metrics;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, TryLockError};
use std::thread::JoinHandle;
use tracing::{debug, error, info, warn};

/// Contexts need strictly more draws than this before a model is trained
pub const MIN_TRAINING_DRAWS: usize = 200;

type ModelSlot = Arc<Mutex<Option<Arc<BoostedModel>>>>;

/// Process-lifetime cache of boosted models, one per lottery context.
///
/// Every context owns a slot mutex; "check cache, else train and insert" runs
/// while holding it, so concurrent callers for the same context train at most
/// once while other contexts stay unblocked.
pub struct ModelStore {
    trainer: BoostedEnsembleTrainer,
    slots: Mutex<HashMap<String, ModelSlot>>,
    pending: Mutex<HashSet<String>>,
    training_runs: AtomicUsize,
    metrics: Option<Metrics>,
}

// Manual Debug implementation, the slots hold trained models
impl std::fmt::Debug for ModelStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelStore")
            .field("training_runs", &self.training_runs())
            .field("slots", &"<Mutex>")
            .finish()
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            error!("ModelStore: Lock poisoned, recovering");
            poisoned.into_inner()
        }
    }
}

impl ModelStore {
    pub fn new(trainer: BoostedEnsembleTrainer) -> Self {
        Self {
            trainer,
            slots: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashSet::new()),
            training_runs: AtomicUsize::new(0),
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Window the cached models were trained with; scoring must extract with the same size.
    pub fn window_size(&self) -> usize {
        self.trainer.config().window_size
    }

    fn slot(&self, lottery_context: &str) -> ModelSlot {
        let mut slots = lock(&self.slots);
        Arc::clone(slots.entry(lottery_context.to_string()).or_default())
    }

    /// Cached model without training. Returns `None` while a training run holds the slot.
    pub fn get(&self, lottery_context: &str) -> Option<Arc<BoostedModel>> {
        let slot = lock(&self.slots).get(lottery_context).cloned()?;
        let cached = match slot.try_lock() {
            Ok(guard) => guard.clone(),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().clone(),
            Err(TryLockError::WouldBlock) => None,
        };
        cached
    }

    /// Returns the cached model, training it first when the context has none
    /// and `history` holds more than `MIN_TRAINING_DRAWS` draws.
    ///
    /// `None` means "score heuristically": either history is too short or training failed.
    pub fn get_or_create(
        &self,
        config: &LotteryConfig,
        history: &[Draw],
    ) -> Option<Arc<BoostedModel>> {
        let context = config.lottery_context.as_str();
        let slot = self.slot(context);
        let mut cached = lock(&slot);

        if let Some(model) = cached.as_ref() {
            self.record_cache("hit");
            return Some(Arc::clone(model));
        }
        self.record_cache("miss");

        if history.len() <= MIN_TRAINING_DRAWS {
            debug!(
                "ModelStore: {} has {} draws (need > {}), using heuristic scoring",
                context,
                history.len(),
                MIN_TRAINING_DRAWS
            );
            return None;
        }

        self.training_runs.fetch_add(1, Ordering::SeqCst);
        match self.trainer.train(context, history, config.max_number) {
            Ok((model, diagnostic)) => {
                if let Some(metrics) = &self.metrics {
                    metrics
                        .training_runs_total
                        .with_label_values(&[context, "success"])
                        .inc();
                    metrics
                        .training_duration_seconds
                        .with_label_values(&[context])
                        .observe(diagnostic.duration_ms as f64 / 1000.0);
                }
                if model.is_empty() {
                    warn!(
                        "ModelStore: {} produced an empty model ({} numbers skipped), not caching",
                        context,
                        diagnostic.numbers_skipped.len()
                    );
                    return None;
                }
                info!(
                    "ModelStore: cached model for {} ({} numbers, {} trees)",
                    context, diagnostic.numbers_trained, diagnostic.trees_retained
                );
                let model = Arc::new(model);
                *cached = Some(Arc::clone(&model));
                Some(model)
            }
            Err(e) => {
                warn!("ModelStore: training failed for {}: {}", context, e);
                if let Some(metrics) = &self.metrics {
                    metrics
                        .training_runs_total
                        .with_label_values(&[context, "failure"])
                        .inc();
                }
                None
            }
        }
    }

    /// Trains on a worker thread and returns immediately.
    ///
    /// Returns `None` when no run was started: the model is cached already,
    /// history is too short, or a run for this context is in flight.
    pub fn request_background_training(
        self: &Arc<Self>,
        config: &LotteryConfig,
        history: Vec<Draw>,
    ) -> Option<JoinHandle<()>> {
        let context = config.lottery_context.clone();
        if history.len() <= MIN_TRAINING_DRAWS || self.get(&context).is_some() {
            return None;
        }
        if !lock(&self.pending).insert(context.clone()) {
            debug!("ModelStore: training for {} already in flight", context);
            return None;
        }

        let store = Arc::clone(self);
        let config = config.clone();
        let spawned = std::thread::Builder::new()
            .name(format!("train-{}", context))
            .spawn(move || {
                store.get_or_create(&config, &history);
                lock(&store.pending).remove(&config.lottery_context);
            });

        match spawned {
            Ok(handle) => {
                info!("ModelStore: background training started for {}", context);
                Some(handle)
            }
            Err(e) => {
                error!("ModelStore: failed to spawn training thread for {}: {}", context, e);
                lock(&self.pending).remove(&context);
                None
            }
        }
    }

    pub fn is_training(&self, lottery_context: &str) -> bool {
        lock(&self.pending).contains(lottery_context)
    }

    /// Drops the cached model so the next request retrains.
    pub fn invalidate(&self, lottery_context: &str) -> bool {
        let Some(slot) = lock(&self.slots).get(lottery_context).cloned() else {
            return false;
        };
        let removed = lock(&slot).take().is_some();
        if removed {
            info!("ModelStore: invalidated model for {}", lottery_context);
        }
        removed
    }

    pub fn cached_contexts(&self) -> Vec<String> {
        let slots: Vec<(String, ModelSlot)> = lock(&self.slots)
            .iter()
            .map(|(k, v)| (k.clone(), Arc::clone(v)))
            .collect();
        let mut contexts: Vec<String> = slots
            .into_iter()
            .filter(|(_, slot)| matches!(slot.try_lock(), Ok(guard) if guard.is_some()))
            .map(|(context, _)| context)
            .collect();
        contexts.sort();
        contexts
    }

    /// Number of training runs started since creation
    pub fn training_runs(&self) -> usize {
        self.training_runs.load(Ordering::SeqCst)
    }

    fn record_cache(&self, result: &str) {
        if let Some(metrics) = &self.metrics {
            metrics.model_cache_total.with_label_values(&[result]).inc();
        }
    }
}

impl Default for ModelStore {
    fn default() -> Self {
        Self::new(BoostedEnsembleTrainer::default())
    }
}
