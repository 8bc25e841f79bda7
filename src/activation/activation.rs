use serde::{Serialize, Deserialize};

/// Element-wise activation for the hidden layer.
///
/// Leaky ReLU is the default: its derivative is never exactly zero, so a
/// hidden unit that wanders into the negative regime keeps a gradient path
/// back out instead of dying.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HiddenActivation {
    LeakyReLU { alpha: f64 },
    Sigmoid,
    Tanh,
}

impl Default for HiddenActivation {
    fn default() -> Self {
        HiddenActivation::LeakyReLU { alpha: 0.1 }
    }
}

impl HiddenActivation {
    pub fn apply(&self, x: f64) -> f64 {
        match self {
            HiddenActivation::LeakyReLU { alpha } => {
                if x > 0.0 { x } else { alpha * x }
            }
            HiddenActivation::Sigmoid => sigmoid(x),
            HiddenActivation::Tanh => x.tanh(),
        }
    }

    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            HiddenActivation::LeakyReLU { alpha } => {
                if x > 0.0 { 1.0 } else { *alpha }
            }
            HiddenActivation::Sigmoid => {
                let s = sigmoid(x);
                s * (1.0 - s)
            }
            HiddenActivation::Tanh => {
                let t = x.tanh();
                1.0 - t * t
            }
        }
    }
}

/// Vector-level activation for the output layer.
///
/// `Softmax` normalizes the logits jointly into a probability distribution;
/// `Sigmoid` squashes each logit independently (binary-per-output variant).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputActivation {
    Softmax,
    Sigmoid,
}

impl Default for OutputActivation {
    fn default() -> Self {
        OutputActivation::Softmax
    }
}

impl OutputActivation {
    pub fn apply(&self, logits: &[f64]) -> Vec<f64> {
        match self {
            OutputActivation::Softmax => softmax(logits),
            OutputActivation::Sigmoid => logits.iter().map(|&z| sigmoid(z)).collect(),
        }
    }
}

/// Logistic sigmoid with the argument clamped to [-500, 500] so `exp` can
/// never overflow to infinity.
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x.clamp(-500.0, 500.0)).exp())
}

/// Numerically stable softmax.
///
/// The max logit is subtracted before exponentiating and each exponent
/// argument is capped at 700 (just under the f64 overflow point). If the
/// exponential sum still underflows to zero, the result falls back to the
/// uniform distribution rather than dividing by zero and spraying NaN.
pub fn softmax(values: &[f64]) -> Vec<f64> {
    if values.is_empty() {
        return Vec::new();
    }

    let max_val = values.iter().fold(f64::NEG_INFINITY, |m, &v| m.max(v));
    let exps: Vec<f64> = values
        .iter()
        .map(|&v| {
            let e = ((v - max_val).min(700.0)).exp();
            if e.is_finite() { e } else { 0.0 }
        })
        .collect();

    let sum: f64 = exps.iter().sum();
    if sum == 0.0 || !sum.is_finite() {
        let uniform = 1.0 / values.len() as f64;
        return vec![uniform; values.len()];
    }

    exps.iter().map(|&e| e / sum).collect()
}
