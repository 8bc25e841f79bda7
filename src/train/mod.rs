pub mod controller;
pub mod epoch_stats;
pub mod loop_fn;
pub mod train_config;

pub use controller::AdaptiveController;
pub use epoch_stats::EpochStats;
pub use loop_fn::{evaluate_accuracy, train_epoch, train_loop, EpochSummary, StopReason, TrainOutcome};
pub use train_config::TrainConfig;
