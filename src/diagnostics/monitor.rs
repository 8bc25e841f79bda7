use serde::Serialize;
use std::fmt;

use crate::data::TrainingExample;
use crate::diagnostics::history::{ConvergenceHistory, Snapshot};
use crate::math::{summary_stats, Matrix};
use crate::network::Network;

/// Snapshots retained in the rolling history.
const HISTORY_CAPACITY: usize = 20;
/// Snapshots considered by the trend analyses.
const TREND_WINDOW: usize = 10;
/// Minimum snapshots before any trend warning is computed.
const MIN_SNAPSHOTS: usize = 5;

const LOSS_PLATEAU_EPS: f64 = 1e-6;
const LOSS_RISING_EPS: f64 = 0.01;
const ACCURACY_PLATEAU_EPS: f64 = 1e-3;
/// Accuracy below which a plateau is worth flagging at all.
const GOOD_ACCURACY: f64 = 0.9;
const WEIGHT_STAGNATION_EPS: f64 = 1e-6;
const EXPLODING_MAGNITUDE: f64 = 10.0;
const SYMMETRY_THRESHOLD: f64 = 0.01;
const DEAD_ACTIVATION_EPS: f64 = 1e-10;
const PREDICTION_STD_THRESHOLD: f64 = 0.05;

/// Advisory findings about the training run. Never errors: training
/// continues regardless, these only inform displayed guidance.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConvergenceWarning {
    /// Loss change and variance over the recent window are both near zero.
    LossPlateau { change: f64 },
    /// Loss has grown over the recent window — possible divergence.
    LossRising { change: f64 },
    /// Accuracy stopped moving while still below the "good" threshold.
    AccuracyPlateau { accuracy: f64 },
    /// Aggregate weight magnitude is barely changing.
    WeightStagnation { magnitude: f64 },
    /// Aggregate weight magnitude has blown past a sane bound.
    WeightsExploding { magnitude: f64 },
    /// Neurons in one layer have learned near-identical weight vectors,
    /// wasting capacity.
    SymmetricNeurons { layer: String, mean_distance: f64 },
    /// Hidden units whose activation stays near zero across every probe
    /// input.
    DeadNeurons { count: usize },
    /// The predicted dog probability barely varies across the dataset —
    /// the model answers the same thing regardless of input.
    UniformPredictions { std: f64 },
    /// NaN/Infinity substitutions happened during training; results stand
    /// but the run was numerically bumpy.
    NumericInstability { events: u64 },
}

impl fmt::Display for ConvergenceWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvergenceWarning::LossPlateau { change } => {
                write!(f, "loss has plateaued (change {:.2e} over recent checkpoints)", change)
            }
            ConvergenceWarning::LossRising { change } => {
                write!(f, "loss is increasing ({:+.4} over recent checkpoints)", change)
            }
            ConvergenceWarning::AccuracyPlateau { accuracy } => {
                write!(f, "accuracy plateaued at {:.1}% — consider a learning-rate change", accuracy * 100.0)
            }
            ConvergenceWarning::WeightStagnation { magnitude } => {
                write!(f, "weights stopped changing (magnitude {:.4})", magnitude)
            }
            ConvergenceWarning::WeightsExploding { magnitude } => {
                write!(f, "weight magnitude {:.2} exceeds the stable range", magnitude)
            }
            ConvergenceWarning::SymmetricNeurons { layer, mean_distance } => {
                write!(f, "{} neurons are nearly identical (mean distance {:.4})", layer, mean_distance)
            }
            ConvergenceWarning::DeadNeurons { count } => {
                write!(f, "{} hidden neuron(s) are inactive across all probe inputs", count)
            }
            ConvergenceWarning::UniformPredictions { std } => {
                write!(f, "predictions barely vary across the dataset (std {:.4})", std)
            }
            ConvergenceWarning::NumericInstability { events } => {
                write!(f, "{} non-finite value(s) were substituted during training", events)
            }
        }
    }
}

/// Everything a UI needs to plot and explain a training run.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticsReport {
    pub loss_history: Vec<f64>,
    pub accuracy_history: Vec<f64>,
    pub weight_magnitude_history: Vec<f64>,
    pub warnings: Vec<ConvergenceWarning>,
}

/// Passive observer of a training run.
///
/// `record` appends a checkpoint snapshot; `scan` recomputes the advisory
/// warnings from the history plus probe passes over the dataset. Neither
/// touches weights or momentum — the only mutation a scan performs is the
/// network's scratch activation state.
#[derive(Debug)]
pub struct ConvergenceMonitor {
    history: ConvergenceHistory,
    warnings: Vec<ConvergenceWarning>,
}

impl Default for ConvergenceMonitor {
    fn default() -> Self {
        ConvergenceMonitor::new()
    }
}

impl ConvergenceMonitor {
    pub fn new() -> ConvergenceMonitor {
        ConvergenceMonitor {
            history: ConvergenceHistory::new(HISTORY_CAPACITY),
            warnings: Vec::new(),
        }
    }

    pub fn history(&self) -> &ConvergenceHistory {
        &self.history
    }

    pub fn record(&mut self, epoch: usize, loss: f64, accuracy: f64, weight_magnitude: f64) {
        self.history.push(Snapshot { epoch, loss, accuracy, weight_magnitude });
    }

    /// Clears recorded history and warnings (network re-initialization).
    pub fn reset(&mut self) {
        self.history = ConvergenceHistory::new(HISTORY_CAPACITY);
        self.warnings.clear();
    }

    /// Recomputes the warning set from recorded history and probe passes
    /// over `dataset`. Returns the warnings found in this scan.
    pub fn scan(&mut self, network: &mut Network, dataset: &[TrainingExample]) -> &[ConvergenceWarning] {
        let mut warnings = Vec::new();

        if self.history.len() >= MIN_SNAPSHOTS {
            let recent = self.history.recent(TREND_WINDOW);

            let losses: Vec<f64> = recent.iter().map(|s| s.loss).collect();
            let loss_change = losses[losses.len() - 1] - losses[0];
            let loss_std = summary_stats(&losses).std;
            if loss_change.abs() < LOSS_PLATEAU_EPS && loss_std < LOSS_PLATEAU_EPS {
                warnings.push(ConvergenceWarning::LossPlateau { change: loss_change });
            }
            if loss_change > LOSS_RISING_EPS {
                warnings.push(ConvergenceWarning::LossRising { change: loss_change });
            }

            let accuracies: Vec<f64> = recent.iter().map(|s| s.accuracy).collect();
            let accuracy = accuracies[accuracies.len() - 1];
            let accuracy_change = accuracy - accuracies[0];
            if accuracy_change.abs() < ACCURACY_PLATEAU_EPS && accuracy < GOOD_ACCURACY {
                warnings.push(ConvergenceWarning::AccuracyPlateau { accuracy });
            }

            let magnitudes: Vec<f64> = recent.iter().map(|s| s.weight_magnitude).collect();
            let magnitude = magnitudes[magnitudes.len() - 1];
            if (magnitude - magnitudes[0]).abs() < WEIGHT_STAGNATION_EPS {
                warnings.push(ConvergenceWarning::WeightStagnation { magnitude });
            }
            if magnitude > EXPLODING_MAGNITUDE {
                warnings.push(ConvergenceWarning::WeightsExploding { magnitude });
            }
        }

        for (name, matrix) in [
            ("input-to-hidden", &network.input_to_hidden),
            ("hidden-to-output", &network.hidden_to_output),
        ] {
            let mean_distance = neuron_symmetry(matrix);
            if matrix.rows >= 2 && mean_distance < SYMMETRY_THRESHOLD {
                warnings.push(ConvergenceWarning::SymmetricNeurons {
                    layer: name.to_string(),
                    mean_distance,
                });
            }
        }

        if !dataset.is_empty() {
            let dead = count_dead_neurons(network, dataset);
            if dead > 0 {
                warnings.push(ConvergenceWarning::DeadNeurons { count: dead });
            }

            let dog_probs: Vec<f64> = dataset
                .iter()
                .map(|ex| network.forward(&ex.input)[0])
                .collect();
            let std = summary_stats(&dog_probs).std;
            if dog_probs.len() >= 2 && std < PREDICTION_STD_THRESHOLD {
                warnings.push(ConvergenceWarning::UniformPredictions { std });
            }
        }

        if network.nan_events() > 0 {
            warnings.push(ConvergenceWarning::NumericInstability {
                events: network.nan_events(),
            });
        }

        self.warnings = warnings;
        &self.warnings
    }

    pub fn warnings(&self) -> &[ConvergenceWarning] {
        &self.warnings
    }

    pub fn report(&self) -> DiagnosticsReport {
        DiagnosticsReport {
            loss_history: self.history.losses(),
            accuracy_history: self.history.accuracies(),
            weight_magnitude_history: self.history.weight_magnitudes(),
            warnings: self.warnings.clone(),
        }
    }
}

/// Mean pairwise L1 distance between neuron weight rows. A value near zero
/// means the neurons compute nearly the same feature.
pub fn neuron_symmetry(matrix: &Matrix) -> f64 {
    if matrix.rows < 2 {
        return 0.0;
    }

    let mut total = 0.0;
    let mut comparisons = 0usize;
    for i in 0..matrix.rows - 1 {
        for j in i + 1..matrix.rows {
            for k in 0..matrix.cols {
                total += (matrix.data[i][k] - matrix.data[j][k]).abs();
                comparisons += 1;
            }
        }
    }

    if comparisons > 0 {
        total / comparisons as f64
    } else {
        0.0
    }
}

/// Number of hidden units whose activation magnitude stays below the dead
/// threshold for every probe input.
fn count_dead_neurons(network: &mut Network, dataset: &[TrainingExample]) -> usize {
    let hidden_size = network.config.hidden_size;
    let mut alive = vec![false; hidden_size];

    for example in dataset {
        network.forward(&example.input);
        for (h, &activation) in network.activations.hidden.iter().enumerate() {
            if activation.abs() >= DEAD_ACTIVATION_EPS {
                alive[h] = true;
            }
        }
    }

    alive.iter().filter(|&&a| !a).count()
}
