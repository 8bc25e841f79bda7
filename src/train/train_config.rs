use std::sync::mpsc;
use std::sync::{atomic::AtomicBool, Arc};

use crate::train::epoch_stats::EpochStats;

/// Configuration for a `train_loop` run.
///
/// # Fields
/// - `max_epochs`           — hard cap on full passes over the dataset
/// - `target_accuracy`      — success threshold in [0, 1]
/// - `eval_interval`        — epochs between accuracy checkpoints
/// - `sustain_checks`       — consecutive checkpoints at or above target
///                            required before declaring success
/// - `max_patience`         — checkpoints without a new best accuracy
///                            before giving up
/// - `min_learning_rate`    — floor for the adaptive controller
/// - `learning_rate_decay`  — per-checkpoint multiplicative decay applied
///                            in the controller's default branch
/// - `adaptive_threshold`   — accuracy at which fine-tuning decay kicks in
/// - `stagnation_threshold` — stagnant checkpoints before the controller
///                            boosts the learning rate and perturbs weights
/// - `perturbation_scale`   — total width of the uniform weight noise
///                            injected on stagnation (±scale/2)
/// - `progress_tx`          — optional channel sender; one `EpochStats` per
///                            checkpoint. If the receiver is dropped the
///                            loop terminates early (clean shutdown).
/// - `stop_flag`            — optional atomic flag; when set from another
///                            thread the loop stops at the next epoch
///                            boundary without corrupting weight state.
pub struct TrainConfig {
    pub max_epochs: usize,
    pub target_accuracy: f64,
    pub eval_interval: usize,
    pub sustain_checks: usize,
    pub max_patience: usize,
    pub min_learning_rate: f64,
    pub learning_rate_decay: f64,
    pub adaptive_threshold: f64,
    pub stagnation_threshold: usize,
    pub perturbation_scale: f64,
    pub progress_tx: Option<mpsc::Sender<EpochStats>>,
    pub stop_flag: Option<Arc<AtomicBool>>,
}

impl Default for TrainConfig {
    fn default() -> Self {
        TrainConfig {
            max_epochs: 200,
            target_accuracy: 1.0,
            eval_interval: 5,
            sustain_checks: 3,
            max_patience: 15,
            min_learning_rate: 0.01,
            learning_rate_decay: 0.99,
            adaptive_threshold: 0.95,
            stagnation_threshold: 5,
            perturbation_scale: 0.01,
            progress_tx: None,
            stop_flag: None,
        }
    }
}

impl TrainConfig {
    /// Creates a `TrainConfig` with the default policy constants, no
    /// progress channel and no stop flag.
    pub fn new(max_epochs: usize, target_accuracy: f64) -> Self {
        TrainConfig {
            max_epochs,
            target_accuracy,
            ..TrainConfig::default()
        }
    }
}
