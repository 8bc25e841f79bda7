use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::loss::CrossEntropyLoss;
use crate::math::Matrix;
use crate::network::config::NetworkConfig;

/// Per-layer scratch state refreshed by every forward pass.
///
/// `hidden_pre` keeps the pre-activation sums so the backward pass can
/// evaluate the activation derivative at the right point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activations {
    pub input: Vec<f64>,
    pub hidden_pre: Vec<f64>,
    pub hidden: Vec<f64>,
    pub output: Vec<f64>,
}

impl Activations {
    fn zeroed(config: &NetworkConfig) -> Activations {
        Activations {
            input: vec![0.0; config.input_size],
            hidden_pre: vec![0.0; config.hidden_size],
            hidden: vec![0.0; config.hidden_size],
            output: vec![0.0; config.output_size],
        }
    }
}

/// A two-layer feed-forward classifier with online momentum training.
///
/// Owns all mutable learning state — weight matrices, momentum buffers and
/// scratch activations — so there is no shared global state anywhere in
/// the engine. The backward pass consumes the activations stored by the
/// most recent [`Network::forward`] call on the same example.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Network {
    pub config: NetworkConfig,
    /// hidden_size x input_size.
    pub input_to_hidden: Matrix,
    /// output_size x hidden_size.
    pub hidden_to_output: Matrix,
    pub momentum_input_to_hidden: Matrix,
    pub momentum_hidden_to_output: Matrix,
    pub activations: Activations,
    /// Count of NaN/Infinity values substituted or skipped so far.
    nan_events: u64,
}

impl Network {
    /// Builds a network with freshly randomized weights.
    ///
    /// # Panics
    /// Panics if `config` fails [`NetworkConfig::validate`].
    pub fn new(config: NetworkConfig) -> Network {
        Network::with_rng(config, &mut rand::thread_rng())
    }

    /// Builds a network from a fixed seed, for reproducible runs and tests.
    pub fn seeded(config: NetworkConfig, seed: u64) -> Network {
        Network::with_rng(config, &mut StdRng::seed_from_u64(seed))
    }

    pub fn with_rng<R: Rng>(config: NetworkConfig, rng: &mut R) -> Network {
        config.validate();
        let config = config.clamped();
        Network {
            input_to_hidden: Matrix::glorot(config.hidden_size, config.input_size, rng),
            hidden_to_output: Matrix::glorot(config.output_size, config.hidden_size, rng),
            momentum_input_to_hidden: Matrix::zeros(config.hidden_size, config.input_size),
            momentum_hidden_to_output: Matrix::zeros(config.output_size, config.hidden_size),
            activations: Activations::zeroed(&config),
            nan_events: 0,
            config,
        }
    }

    /// Re-randomizes the weights and zeroes momentum, activations and the
    /// NaN counter. Equivalent to building a fresh network with the same
    /// configuration.
    pub fn reinitialize<R: Rng>(&mut self, rng: &mut R) {
        let cfg = self.config;
        self.input_to_hidden = Matrix::glorot(cfg.hidden_size, cfg.input_size, rng);
        self.hidden_to_output = Matrix::glorot(cfg.output_size, cfg.hidden_size, rng);
        self.reset_momentum();
        self.activations = Activations::zeroed(&cfg);
        self.nan_events = 0;
    }

    /// Computes the output distribution for `input`, storing the hidden and
    /// output activations for the backward pass.
    ///
    /// Deterministic for fixed weights. Any NaN appearing mid-pass is
    /// replaced with a safe default (0 for a pre-activation sum, the
    /// uniform probability for an output component) and counted in
    /// [`Network::nan_events`] — a broken number never propagates forward.
    ///
    /// # Panics
    /// Panics if `input.len() != config.input_size`.
    pub fn forward(&mut self, input: &[f64]) -> Vec<f64> {
        assert_eq!(
            input.len(),
            self.config.input_size,
            "input vector length {} does not match input_size {}",
            input.len(),
            self.config.input_size
        );

        self.activations.input.copy_from_slice(input);

        for h in 0..self.config.hidden_size {
            let mut sum = 0.0;
            for i in 0..self.config.input_size {
                sum += self.activations.input[i] * self.input_to_hidden.data[h][i];
            }
            let pre = self.guarded(sum, 0.0);
            self.activations.hidden_pre[h] = pre;
            self.activations.hidden[h] = self.config.hidden_activation.apply(pre);
        }

        let mut logits = vec![0.0; self.config.output_size];
        for o in 0..self.config.output_size {
            let mut sum = 0.0;
            for h in 0..self.config.hidden_size {
                sum += self.activations.hidden[h] * self.hidden_to_output.data[o][h];
            }
            logits[o] = self.guarded(sum, 0.0);
        }

        let uniform = 1.0 / self.config.output_size as f64;
        let mut output = self.config.output_activation.apply(&logits);
        for p in &mut output {
            *p = self.guarded(*p, uniform);
        }

        self.activations.output.copy_from_slice(&output);
        output
    }

    /// One backpropagation step against the activations stored by the most
    /// recent forward pass, with a per-example weight of 1.
    pub fn backward(&mut self, target: &[f64]) {
        self.backward_weighted(target, 1.0);
    }

    /// Backpropagation with momentum, L2 weight decay and two-stage
    /// clipping: each raw gradient is clamped to `±gradient_clip` before
    /// the momentum update, and each weight to `±weight_bound` after it.
    ///
    /// A non-finite update skips that single weight (and zeroes its
    /// momentum slot so the corruption cannot linger); the rest of the
    /// pass continues. Weights are never set to NaN.
    ///
    /// # Panics
    /// Panics if `target.len() != config.output_size`.
    pub fn backward_weighted(&mut self, target: &[f64], sample_weight: f64) {
        assert_eq!(
            target.len(),
            self.config.output_size,
            "target vector length {} does not match output_size {}",
            target.len(),
            self.config.output_size
        );

        let cfg = self.config;

        // Softmax + cross-entropy pairing: (target - output) is already the
        // gradient of the loss w.r.t. the pre-activation logits.
        let mut output_errors = CrossEntropyLoss::output_error(&self.activations.output, target);
        for err in output_errors.iter_mut() {
            *err *= sample_weight;
            if !err.is_finite() {
                self.nan_events += 1;
                return;
            }
        }

        for o in 0..cfg.output_size {
            for h in 0..cfg.hidden_size {
                let mut gradient = output_errors[o] * self.activations.hidden[h];
                gradient -= cfg.l2_lambda * self.hidden_to_output.data[o][h];
                gradient = gradient.clamp(-cfg.gradient_clip, cfg.gradient_clip);

                let update = cfg.momentum_coefficient * self.momentum_hidden_to_output.data[o][h]
                    + cfg.learning_rate * gradient;
                if !update.is_finite() {
                    self.nan_events += 1;
                    self.momentum_hidden_to_output.data[o][h] = 0.0;
                    continue;
                }
                self.momentum_hidden_to_output.data[o][h] = update;
                self.hidden_to_output.data[o][h] = (self.hidden_to_output.data[o][h] + update)
                    .clamp(-cfg.weight_bound, cfg.weight_bound);
            }
        }

        let mut hidden_errors = vec![0.0; cfg.hidden_size];
        for h in 0..cfg.hidden_size {
            let mut err = 0.0;
            for o in 0..cfg.output_size {
                err += output_errors[o] * self.hidden_to_output.data[o][h];
            }
            err *= cfg.hidden_activation.derivative(self.activations.hidden_pre[h]);
            hidden_errors[h] = self.guarded(err, 0.0);
        }

        for h in 0..cfg.hidden_size {
            for i in 0..cfg.input_size {
                let mut gradient = hidden_errors[h] * self.activations.input[i];
                gradient -= cfg.l2_lambda * self.input_to_hidden.data[h][i];
                gradient = gradient.clamp(-cfg.gradient_clip, cfg.gradient_clip);

                let update = cfg.momentum_coefficient * self.momentum_input_to_hidden.data[h][i]
                    + cfg.learning_rate * gradient;
                if !update.is_finite() {
                    self.nan_events += 1;
                    self.momentum_input_to_hidden.data[h][i] = 0.0;
                    continue;
                }
                self.momentum_input_to_hidden.data[h][i] = update;
                self.input_to_hidden.data[h][i] = (self.input_to_hidden.data[h][i] + update)
                    .clamp(-cfg.weight_bound, cfg.weight_bound);
            }
        }
    }

    /// Adds uniform noise in `±scale/2` to every weight. Used by the
    /// anti-stagnation measure to break up symmetric neurons; small enough
    /// to nudge rather than erase what has been learned.
    pub fn perturb_weights<R: Rng>(&mut self, scale: f64, rng: &mut R) {
        let bound = self.config.weight_bound;
        for row in self
            .input_to_hidden
            .data
            .iter_mut()
            .chain(self.hidden_to_output.data.iter_mut())
        {
            for w in row.iter_mut() {
                *w = (*w + (rng.gen::<f64>() - 0.5) * scale).clamp(-bound, bound);
            }
        }
    }

    /// Zeroes both momentum buffers for a fresh gradient flow.
    pub fn reset_momentum(&mut self) {
        self.momentum_input_to_hidden.reset();
        self.momentum_hidden_to_output.reset();
    }

    /// Aggregate L2 norm over every weight in both matrices.
    pub fn weight_magnitude(&self) -> f64 {
        (self.input_to_hidden.sum_of_squares() + self.hidden_to_output.sum_of_squares()).sqrt()
    }

    /// True if no weight in either matrix is NaN or infinite.
    pub fn weights_finite(&self) -> bool {
        self.input_to_hidden.all_finite() && self.hidden_to_output.all_finite()
    }

    /// How many NaN/Infinity values have been substituted or skipped since
    /// initialization. Surfaced through diagnostics; a non-zero count means
    /// the numeric-safety net fired but training carried on.
    pub fn nan_events(&self) -> u64 {
        self.nan_events
    }

    fn guarded(&mut self, x: f64, fallback: f64) -> f64 {
        if x.is_finite() {
            x
        } else {
            self.nan_events += 1;
            fallback
        }
    }

    /// Serializes the network (weights, momentum, config) to a
    /// pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }

    /// Deserializes a network from a JSON file previously written by
    /// `save_json`.
    pub fn load_json(path: &str) -> std::io::Result<Network> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))
    }
}
