pub mod history;
pub mod monitor;

pub use history::{ConvergenceHistory, Snapshot};
pub use monitor::{neuron_symmetry, ConvergenceMonitor, ConvergenceWarning, DiagnosticsReport};
