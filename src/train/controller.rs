use rand::Rng;

use crate::network::Network;
use crate::train::train_config::TrainConfig;

/// Minimum accuracy gain for a checkpoint to count as an improvement.
const IMPROVEMENT_EPS: f64 = 1e-6;

/// How many recent checkpoints the improvement trend is measured over.
const TREND_WINDOW: usize = 5;

/// Adaptive learning-rate state machine driven by the accuracy trend.
///
/// Policy, evaluated once per checkpoint:
/// 1. accuracy at or above the adaptive threshold — fine-tuning, decay by 0.95;
/// 2. flat trend and a stagnation streak — boost by 1.2 to escape the plateau;
/// 3. accuracy below 0.7 — hold at or above 80% of the initial rate;
/// 4. otherwise — standard multiplicative decay.
///
/// The rate is always clamped to `[min_learning_rate, initial rate]`.
pub struct AdaptiveController {
    initial_learning_rate: f64,
    current_learning_rate: f64,
    min_learning_rate: f64,
    decay: f64,
    adaptive_threshold: f64,
    stagnation_threshold: usize,
    stagnation_counter: usize,
    best_accuracy: f64,
    recent_accuracy: Vec<f64>,
}

impl AdaptiveController {
    pub fn new(initial_learning_rate: f64, config: &TrainConfig) -> AdaptiveController {
        AdaptiveController {
            initial_learning_rate,
            current_learning_rate: initial_learning_rate,
            min_learning_rate: config.min_learning_rate.min(initial_learning_rate),
            decay: config.learning_rate_decay,
            adaptive_threshold: config.adaptive_threshold,
            stagnation_threshold: config.stagnation_threshold,
            stagnation_counter: 0,
            best_accuracy: 0.0,
            recent_accuracy: Vec::new(),
        }
    }

    pub fn learning_rate(&self) -> f64 {
        self.current_learning_rate
    }

    pub fn stagnation_counter(&self) -> usize {
        self.stagnation_counter
    }

    /// Records a checkpoint accuracy and advances the learning-rate state
    /// machine.
    pub fn observe(&mut self, accuracy: f64) {
        if accuracy > self.best_accuracy + IMPROVEMENT_EPS {
            self.best_accuracy = accuracy;
            self.stagnation_counter = 0;
        } else {
            self.stagnation_counter += 1;
        }

        self.recent_accuracy.push(accuracy);
        if self.recent_accuracy.len() > TREND_WINDOW {
            self.recent_accuracy.remove(0);
        }

        self.adapt(accuracy);
    }

    fn adapt(&mut self, accuracy: f64) {
        if self.recent_accuracy.len() < TREND_WINDOW {
            return;
        }

        let first = self.recent_accuracy[0];
        let last = self.recent_accuracy[TREND_WINDOW - 1];
        let improvement_rate = (last - first) / TREND_WINDOW as f64;

        if accuracy >= self.adaptive_threshold {
            // Fine-tuning phase.
            self.current_learning_rate *= 0.95;
        } else if improvement_rate < 0.01 && self.stagnation_counter > self.stagnation_threshold {
            // Plateau escape.
            self.current_learning_rate =
                (self.current_learning_rate * 1.2).min(self.initial_learning_rate);
        } else if accuracy < 0.7 {
            // Early training: keep the rate aggressive.
            self.current_learning_rate = self
                .current_learning_rate
                .max(self.initial_learning_rate * 0.8);
        } else {
            self.current_learning_rate *= self.decay;
        }

        self.current_learning_rate = self
            .current_learning_rate
            .clamp(self.min_learning_rate, self.initial_learning_rate);
    }

    /// True when the stagnation streak has just hit a multiple of the
    /// threshold, i.e. the corrective perturbation is due.
    pub fn perturbation_due(&self) -> bool {
        self.stagnation_counter >= self.stagnation_threshold
            && self.stagnation_counter % self.stagnation_threshold == 0
    }

    /// Symmetry-breaking kick for a stalled network: small uniform noise
    /// into every weight, momentum zeroed, learning rate boosted (capped
    /// at the initial rate). Deliberately not gradient-based.
    pub fn apply_anti_stagnation<R: Rng>(
        &mut self,
        network: &mut Network,
        perturbation_scale: f64,
        rng: &mut R,
    ) {
        network.perturb_weights(perturbation_scale, rng);
        network.reset_momentum();
        self.current_learning_rate = (self.current_learning_rate * 1.5)
            .min(self.initial_learning_rate)
            .max(self.min_learning_rate);
    }
}
