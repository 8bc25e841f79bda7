use serde::{Serialize, Deserialize};
use std::collections::VecDeque;

/// One convergence checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub epoch: usize,
    pub loss: f64,
    pub accuracy: f64,
    pub weight_magnitude: f64,
}

/// Bounded FIFO ring of convergence snapshots. Append-only until capacity,
/// then the oldest snapshot is evicted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceHistory {
    capacity: usize,
    snapshots: VecDeque<Snapshot>,
}

impl ConvergenceHistory {
    pub fn new(capacity: usize) -> ConvergenceHistory {
        ConvergenceHistory {
            capacity: capacity.max(1),
            snapshots: VecDeque::new(),
        }
    }

    pub fn push(&mut self, snapshot: Snapshot) {
        if self.snapshots.len() == self.capacity {
            self.snapshots.pop_front();
        }
        self.snapshots.push_back(snapshot);
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snapshot> {
        self.snapshots.iter()
    }

    /// The most recent `n` snapshots, oldest first.
    pub fn recent(&self, n: usize) -> Vec<Snapshot> {
        let skip = self.snapshots.len().saturating_sub(n);
        self.snapshots.iter().skip(skip).copied().collect()
    }

    pub fn losses(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.loss).collect()
    }

    pub fn accuracies(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.accuracy).collect()
    }

    pub fn weight_magnitudes(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.weight_magnitude).collect()
    }
}
