pub mod math;
pub mod activation;
pub mod loss;
pub mod network;
pub mod data;
pub mod train;
pub mod diagnostics;

// Convenience re-exports
pub use math::Matrix;
pub use activation::{HiddenActivation, OutputActivation};
pub use loss::CrossEntropyLoss;
pub use network::{Network, NetworkConfig};
pub use data::{dog_dataset, prototype_dataset, TrainingExample};
pub use train::{evaluate_accuracy, train_epoch, train_loop, TrainConfig, TrainOutcome};
pub use diagnostics::{ConvergenceMonitor, ConvergenceWarning, DiagnosticsReport};
