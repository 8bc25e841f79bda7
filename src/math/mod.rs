pub mod matrix;
pub mod stats;

pub use matrix::Matrix;
pub use stats::{summary_stats, SummaryStats};
