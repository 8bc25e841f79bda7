/// Categorical cross-entropy loss for use with a Softmax output layer.
pub struct CrossEntropyLoss;

/// Floor applied inside log() to prevent log(0) = -inf.
const EPS: f64 = 1e-15;

impl CrossEntropyLoss {
    /// Computes the scalar cross-entropy loss:
    ///   L = -sum(expected[i] * log(max(predicted[i], eps)))
    ///
    /// `predicted` — softmax probabilities, shape [n_classes]
    /// `expected`  — one-hot (or soft) target distribution, shape [n_classes]
    pub fn loss(predicted: &[f64], expected: &[f64]) -> f64 {
        predicted
            .iter()
            .zip(expected.iter())
            .map(|(p, e)| if *e > 0.0 { -e * p.max(EPS).ln() } else { 0.0 })
            .sum()
    }

    /// Gradient of the combined Softmax + cross-entropy w.r.t. the
    /// pre-softmax logits: `expected[i] - predicted[i]` element-wise,
    /// oriented so the backward pass can *add* `lr * gradient` to weights.
    pub fn output_error(predicted: &[f64], expected: &[f64]) -> Vec<f64> {
        predicted
            .iter()
            .zip(expected.iter())
            .map(|(p, e)| e - p)
            .collect()
    }
}
