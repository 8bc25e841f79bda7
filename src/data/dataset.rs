use serde::{Serialize, Deserialize};

/// One labeled sample: a 4-feature input vector and its one-hot target.
///
/// Output index 0 is the "dog" class, index 1 "not-dog". The `label` and
/// `is_dog` fields are metadata for diagnostics and logging; the engine
/// itself trains only on `input` and `target`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingExample {
    pub input: Vec<f64>,
    pub target: Vec<f64>,
    pub label: String,
    pub is_dog: bool,
}

impl TrainingExample {
    pub fn new(input: Vec<f64>, is_dog: bool, label: &str) -> TrainingExample {
        TrainingExample {
            input,
            target: if is_dog { vec![1.0, 0.0] } else { vec![0.0, 1.0] },
            label: label.to_string(),
            is_dog,
        }
    }
}

/// The full 8-image training set.
///
/// Feature order is [pattern A, pattern B, pattern C, pattern D]. Dogs are
/// HIGH-HIGH-LOW-LOW variants; non-dogs alternate (LOW-HIGH-LOW-HIGH or
/// HIGH-LOW-HIGH-LOW), giving 8 distinct combinations that 4 hidden units
/// can separate.
pub fn dog_dataset() -> Vec<TrainingExample> {
    vec![
        TrainingExample::new(vec![0.9, 0.9, 0.1, 0.1], true, "dog1"),
        TrainingExample::new(vec![0.8, 0.7, 0.2, 0.3], true, "dog2"),
        TrainingExample::new(vec![0.7, 0.8, 0.3, 0.2], true, "dog3"),
        TrainingExample::new(vec![0.1, 0.9, 0.1, 0.9], false, "cat"),
        TrainingExample::new(vec![0.2, 0.8, 0.3, 0.7], false, "bird"),
        TrainingExample::new(vec![0.3, 0.7, 0.2, 0.8], false, "car"),
        TrainingExample::new(vec![0.9, 0.1, 0.9, 0.1], false, "tree"),
        TrainingExample::new(vec![0.8, 0.2, 0.7, 0.3], false, "fish"),
    ]
}

/// A minimal 4-example curriculum of maximally separated prototypes
/// (clear dog, clear cat, family dog, inanimate object). Useful for fast
/// sanity checks and the convergence tests.
pub fn prototype_dataset() -> Vec<TrainingExample> {
    vec![
        TrainingExample::new(vec![0.8, 0.9, 1.0, 0.95], true, "prototype-dog"),
        TrainingExample::new(vec![0.3, 0.6, 0.05, 0.75], false, "prototype-cat"),
        TrainingExample::new(vec![0.65, 0.85, 0.9, 0.9], true, "family-dog"),
        TrainingExample::new(vec![0.4, 0.05, 0.0, 0.0], false, "object"),
    ]
}
