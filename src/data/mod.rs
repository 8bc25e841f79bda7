pub mod dataset;

pub use dataset::{dog_dataset, prototype_dataset, TrainingExample};
