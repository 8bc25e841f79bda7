use serde::{Serialize, Deserialize};

/// Checkpoint statistics emitted by `train_loop`.
///
/// When a `progress_tx` channel is configured in `TrainConfig`, one
/// `EpochStats` value is sent at every accuracy checkpoint. Receivers
/// (charts, progress readouts) can render these without touching the
/// network itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EpochStats {
    /// 1-based epoch number.
    pub epoch: usize,
    /// Total epoch budget for this run.
    pub max_epochs: usize,
    /// Mean cross-entropy loss over the epoch's examples.
    pub loss: f64,
    /// Training-set accuracy in [0, 1] at this checkpoint.
    pub accuracy: f64,
    /// Learning rate in effect after the adaptive controller's step.
    pub learning_rate: f64,
    /// Aggregate L2 norm over all weights.
    pub weight_magnitude: f64,
    /// Wall-clock duration of the epochs since the last checkpoint, in ms.
    pub elapsed_ms: u64,
}
