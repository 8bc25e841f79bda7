use std::sync::atomic::Ordering;
use std::time::Instant;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::data::TrainingExample;
use crate::diagnostics::ConvergenceMonitor;
use crate::loss::CrossEntropyLoss;
use crate::network::Network;
use crate::train::controller::AdaptiveController;
use crate::train::epoch_stats::EpochStats;
use crate::train::train_config::TrainConfig;

/// Minimum accuracy gain for a checkpoint to reset the patience budget.
const IMPROVEMENT_EPS: f64 = 1e-6;

/// Why `train_loop` stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Target accuracy held for the required consecutive checkpoints.
    TargetReached,
    /// No checkpoint improved on the best accuracy within the patience
    /// budget.
    PatienceExhausted,
    /// The epoch budget ran out.
    MaxEpochs,
    /// Stop flag set or progress receiver dropped. The last fully applied
    /// weight update stands; the network remains usable.
    Cancelled,
}

/// Result of a `train_loop` run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrainOutcome {
    pub epochs_run: usize,
    pub final_loss: f64,
    pub final_accuracy: f64,
    pub best_accuracy: f64,
    pub stop_reason: StopReason,
}

impl TrainOutcome {
    pub fn converged(&self) -> bool {
        self.stop_reason == StopReason::TargetReached
    }
}

/// Per-epoch summary returned by [`train_epoch`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EpochSummary {
    pub loss: f64,
    pub accuracy: f64,
}

/// One full shuffled sweep over the dataset: forward + backward per
/// example, then a read-only accuracy evaluation.
///
/// # Panics
/// Panics if `dataset` is empty.
pub fn train_epoch(network: &mut Network, dataset: &[TrainingExample]) -> EpochSummary {
    let loss = run_one_epoch(network, dataset, &mut rand::thread_rng());
    let accuracy = evaluate_accuracy(network, dataset);
    EpochSummary { loss, accuracy }
}

/// Fraction of examples whose predicted class (argmax over the output
/// distribution) matches the labeled class.
///
/// Read-only with respect to learned state: forward passes refresh scratch
/// activations but never weights, so calling this twice in a row yields
/// the same value.
pub fn evaluate_accuracy(network: &mut Network, dataset: &[TrainingExample]) -> f64 {
    if dataset.is_empty() {
        return 0.0;
    }
    let correct = dataset
        .iter()
        .filter(|ex| {
            let output = network.forward(&ex.input);
            argmax(&output) == argmax(&ex.target)
        })
        .count();
    correct as f64 / dataset.len() as f64
}

/// Trains `network` until the target accuracy is sustained, patience runs
/// out, the epoch budget is spent, or the run is cancelled.
///
/// Each epoch is one shuffled online pass (updates from example N are
/// visible to example N+1). Every `config.eval_interval` epochs — and at
/// epoch 1 — the loop takes an accuracy checkpoint: the adaptive
/// controller steps the learning rate, stagnation may trigger the
/// perturbation measure, the monitor records and re-scans, and an
/// `EpochStats` is sent on the progress channel if one is configured.
///
/// # Early termination
/// The loop breaks at the next epoch boundary if `config.stop_flag` is
/// set, or at the next checkpoint if the `progress_tx` receiver has been
/// dropped. Either way the network keeps whatever the last fully-applied
/// update produced.
///
/// # Panics
/// Panics if `dataset` is empty or `config.eval_interval` is zero.
pub fn train_loop(
    network: &mut Network,
    dataset: &[TrainingExample],
    config: &TrainConfig,
    monitor: &mut ConvergenceMonitor,
) -> TrainOutcome {
    assert!(!dataset.is_empty(), "dataset must not be empty");
    assert!(config.eval_interval >= 1, "eval_interval must be at least 1");

    let mut rng = rand::thread_rng();
    let mut controller = AdaptiveController::new(network.config.learning_rate, config);

    let mut best_accuracy = 0.0_f64;
    let mut patience = 0usize;
    let mut sustained = 0usize;
    let mut last_loss = f64::INFINITY;
    let mut last_accuracy = 0.0_f64;
    let mut epochs_run = 0usize;
    let mut stop_reason = StopReason::MaxEpochs;
    let mut checkpoint_start = Instant::now();

    for epoch in 1..=config.max_epochs {
        if stop_requested(config) {
            stop_reason = StopReason::Cancelled;
            break;
        }

        last_loss = run_one_epoch(network, dataset, &mut rng);
        epochs_run = epoch;

        if epoch % config.eval_interval != 0 && epoch != 1 {
            continue;
        }

        // ── Checkpoint ────────────────────────────────────────────────
        last_accuracy = evaluate_accuracy(network, dataset);

        controller.observe(last_accuracy);
        if controller.perturbation_due() {
            controller.apply_anti_stagnation(network, config.perturbation_scale, &mut rng);
        }
        network.config.learning_rate = controller.learning_rate();

        monitor.record(epoch, last_loss, last_accuracy, network.weight_magnitude());
        monitor.scan(network, dataset);

        let elapsed_ms = checkpoint_start.elapsed().as_millis() as u64;
        checkpoint_start = Instant::now();
        if let Some(ref tx) = config.progress_tx {
            let stats = EpochStats {
                epoch,
                max_epochs: config.max_epochs,
                loss: last_loss,
                accuracy: last_accuracy,
                learning_rate: network.config.learning_rate,
                weight_magnitude: network.weight_magnitude(),
                elapsed_ms,
            };
            // Receiver gone: the consumer walked away, stop cleanly.
            if tx.send(stats).is_err() {
                stop_reason = StopReason::Cancelled;
                break;
            }
        }

        if last_accuracy >= config.target_accuracy {
            sustained += 1;
            if sustained >= config.sustain_checks {
                best_accuracy = best_accuracy.max(last_accuracy);
                stop_reason = StopReason::TargetReached;
                break;
            }
        } else {
            sustained = 0;
        }

        if last_accuracy > best_accuracy + IMPROVEMENT_EPS {
            best_accuracy = last_accuracy;
            patience = 0;
        } else {
            patience += 1;
            if patience >= config.max_patience {
                stop_reason = StopReason::PatienceExhausted;
                break;
            }
        }
    }

    // The loop can end between checkpoints; make the reported accuracy
    // reflect the final weights.
    if stop_reason == StopReason::MaxEpochs {
        last_accuracy = evaluate_accuracy(network, dataset);
        best_accuracy = best_accuracy.max(last_accuracy);
    }

    TrainOutcome {
        epochs_run,
        final_loss: last_loss,
        final_accuracy: last_accuracy,
        best_accuracy,
        stop_reason,
    }
}

/// One shuffled online pass. Returns the mean cross-entropy loss.
fn run_one_epoch<R: Rng>(network: &mut Network, dataset: &[TrainingExample], rng: &mut R) -> f64 {
    assert!(!dataset.is_empty(), "dataset must not be empty");

    let mut indices: Vec<usize> = (0..dataset.len()).collect();
    indices.shuffle(rng);

    let mut total_loss = 0.0;
    for &idx in &indices {
        let example = &dataset[idx];
        let output = network.forward(&example.input);
        total_loss += CrossEntropyLoss::loss(&output, &example.target);
        network.backward(&example.target);
    }
    total_loss / dataset.len() as f64
}

fn stop_requested(config: &TrainConfig) -> bool {
    config
        .stop_flag
        .as_ref()
        .map(|flag| flag.load(Ordering::Relaxed))
        .unwrap_or(false)
}

/// Index of the maximum element in a slice.
fn argmax(v: &[f64]) -> usize {
    v.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(i, _)| i)
        .unwrap_or(0)
}
