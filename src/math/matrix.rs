use rand::Rng;
use serde::{Serialize, Deserialize};
use std::f64::consts::PI;

/// Dense row-major matrix used for weight and momentum storage.
///
/// Rows index the destination neurons, columns the source neurons, so
/// `data[h][i]` is the weight from input `i` into hidden unit `h` —
/// matching the update loops in the backward pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Matrix {
    pub rows: usize,
    pub cols: usize,
    pub data: Vec<Vec<f64>>,
}

impl Matrix {
    pub fn zeros(rows: usize, cols: usize) -> Matrix {
        Matrix {
            rows,
            cols,
            data: vec![vec![0.0; cols]; rows],
        }
    }

    /// Samples a single value from N(0, 1) using the Box-Muller transform.
    /// Both u1 and u2 must be uniform on (0, 1].
    fn sample_standard_normal<R: Rng>(rng: &mut R) -> f64 {
        // Draw two independent uniform samples in (0, 1] to avoid log(0).
        let u1: f64 = 1.0 - rng.gen::<f64>();
        let u2: f64 = 1.0 - rng.gen::<f64>();
        (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos()
    }

    /// Variance-scaled random initialization: samples from
    /// N(0, sqrt(2 / (fan_in + fan_out))).
    ///
    /// Keeps early activations small enough that softmax saturation and
    /// near-identical hidden units don't show up right at the start of
    /// training. `cols` is the fan-in, `rows` the fan-out.
    pub fn glorot<R: Rng>(rows: usize, cols: usize, rng: &mut R) -> Matrix {
        let std_dev = (2.0 / (rows + cols) as f64).sqrt();
        let mut res = Matrix::zeros(rows, cols);
        for i in 0..rows {
            for j in 0..cols {
                res.data[i][j] = Matrix::sample_standard_normal(rng) * std_dev;
            }
        }
        res
    }

    /// Sets every entry to zero (momentum buffer reset).
    pub fn reset(&mut self) {
        for row in &mut self.data {
            row.fill(0.0);
        }
    }

    /// Sum of squared entries; callers take the square root once when an
    /// aggregate L2 magnitude over several matrices is needed.
    pub fn sum_of_squares(&self) -> f64 {
        self.data.iter().flatten().map(|w| w * w).sum()
    }

    /// All entries flattened into one vector, row by row.
    pub fn flat(&self) -> Vec<f64> {
        self.data.iter().flatten().copied().collect()
    }

    /// True if every entry is a finite number.
    pub fn all_finite(&self) -> bool {
        self.data.iter().flatten().all(|w| w.is_finite())
    }
}
