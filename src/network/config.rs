use serde::{Serialize, Deserialize};
use crate::activation::{HiddenActivation, OutputActivation};

/// Architecture and hyperparameters for a [`Network`](crate::Network).
///
/// Values typically originate from user-facing parameter controls, so the
/// numeric hyperparameters are clamped into a runnable range by
/// [`NetworkConfig::clamped`] instead of being rejected. Structural
/// mistakes (a zero-sized layer, a non-positive learning rate) are caller
/// bugs and fail fast in [`NetworkConfig::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub input_size: usize,
    pub hidden_size: usize,
    pub output_size: usize,
    /// Step size applied inside the momentum update.
    pub learning_rate: f64,
    /// Fraction of the previous update carried into the next one, in [0, 1).
    pub momentum_coefficient: f64,
    /// L2 weight-decay strength subtracted from each gradient.
    pub l2_lambda: f64,
    pub hidden_activation: HiddenActivation,
    pub output_activation: OutputActivation,
    /// Hard bound on weight values after every update.
    pub weight_bound: f64,
    /// Hard bound on each per-weight gradient before momentum is applied.
    pub gradient_clip: f64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        NetworkConfig {
            input_size: 4,
            hidden_size: 4,
            output_size: 2,
            learning_rate: 0.1,
            momentum_coefficient: 0.5,
            l2_lambda: 0.001,
            hidden_activation: HiddenActivation::default(),
            output_activation: OutputActivation::default(),
            weight_bound: 3.0,
            gradient_clip: 5.0,
        }
    }
}

impl NetworkConfig {
    /// Returns a copy with every numeric hyperparameter pulled into its
    /// valid range. Slider input can therefore never put the engine into a
    /// state it cannot train from.
    pub fn clamped(&self) -> NetworkConfig {
        let mut cfg = *self;
        cfg.learning_rate = cfg.learning_rate.min(1.0);
        cfg.momentum_coefficient = cfg.momentum_coefficient.clamp(0.0, 0.999);
        cfg.l2_lambda = cfg.l2_lambda.max(0.0);
        cfg.weight_bound = cfg.weight_bound.clamp(1.0, 8.0);
        cfg.gradient_clip = cfg.gradient_clip.clamp(0.1, 10.0);
        if let HiddenActivation::LeakyReLU { alpha } = &mut cfg.hidden_activation {
            *alpha = alpha.clamp(0.001, 0.5);
        }
        cfg
    }

    /// Checks the structural invariants.
    ///
    /// # Panics
    /// Panics if any layer size is zero or the learning rate is not a
    /// positive finite number.
    pub fn validate(&self) {
        assert!(self.input_size >= 1, "input_size must be at least 1");
        assert!(self.hidden_size >= 1, "hidden_size must be at least 1");
        assert!(self.output_size >= 1, "output_size must be at least 1");
        assert!(
            self.learning_rate > 0.0 && self.learning_rate.is_finite(),
            "learning_rate must be a positive finite number, got {}",
            self.learning_rate
        );
    }
}
