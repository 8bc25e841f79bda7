//! End-to-end training tests: the loop on the bundled datasets, stop
//! conditions, the progress channel and the cooperative stop flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

use woof_nn::train::StopReason;
use woof_nn::{
    dog_dataset, evaluate_accuracy, prototype_dataset, train_epoch, train_loop,
    ConvergenceMonitor, Network, NetworkConfig, TrainConfig,
};

fn learner(seed: u64) -> Network {
    Network::seeded(
        NetworkConfig {
            learning_rate: 0.3,
            ..NetworkConfig::default()
        },
        seed,
    )
}

// ============================================================================
// Learning on the bundled datasets
// ============================================================================

#[test]
fn hundred_epochs_classify_at_least_seven_of_eight_examples() {
    let mut network = learner(42);
    let dataset = dog_dataset();
    let mut monitor = ConvergenceMonitor::new();
    let config = TrainConfig {
        max_epochs: 100,
        max_patience: 50,
        ..TrainConfig::default()
    };

    let outcome = train_loop(&mut network, &dataset, &config, &mut monitor);

    assert!(
        outcome.best_accuracy >= 0.875,
        "expected at least 7/8 examples learned, best accuracy was {}",
        outcome.best_accuracy
    );
    assert!(network.weights_finite());
    assert!(outcome.final_loss.is_finite());
    assert!(outcome.epochs_run >= 1 && outcome.epochs_run <= config.max_epochs);
}

#[test]
fn default_hyperparameters_converge_on_the_prototype_dataset() {
    let mut network = Network::seeded(NetworkConfig::default(), 7);
    let dataset = prototype_dataset();
    let mut monitor = ConvergenceMonitor::new();
    let config = TrainConfig {
        max_epochs: 200,
        max_patience: 50,
        ..TrainConfig::default()
    };

    let outcome = train_loop(&mut network, &dataset, &config, &mut monitor);

    assert!(
        outcome.best_accuracy >= 0.9,
        "well-separated prototypes should be fully learnable, best accuracy was {}",
        outcome.best_accuracy
    );
    assert!(network.weights_finite());
}

#[test]
fn adaptive_rate_stays_within_its_operating_band() {
    let mut network = learner(13);
    let dataset = dog_dataset();
    let mut monitor = ConvergenceMonitor::new();
    let config = TrainConfig {
        max_epochs: 120,
        max_patience: 50,
        ..TrainConfig::default()
    };
    let initial = network.config.learning_rate;

    train_loop(&mut network, &dataset, &config, &mut monitor);

    let lr = network.config.learning_rate;
    assert!(
        lr >= config.min_learning_rate && lr <= initial,
        "learning rate {lr} escaped [{}, {initial}]",
        config.min_learning_rate
    );
}

// ============================================================================
// Single-epoch and evaluation helpers
// ============================================================================

#[test]
fn train_epoch_reports_finite_loss_and_bounded_accuracy() {
    let mut network = learner(3);
    let dataset = dog_dataset();

    let summary = train_epoch(&mut network, &dataset);

    assert!(summary.loss.is_finite() && summary.loss >= 0.0);
    assert!((0.0..=1.0).contains(&summary.accuracy));
}

#[test]
fn evaluate_accuracy_is_idempotent() {
    let mut network = learner(5);
    let dataset = dog_dataset();

    let weights_before = network.input_to_hidden.flat();
    let first = evaluate_accuracy(&mut network, &dataset);
    let second = evaluate_accuracy(&mut network, &dataset);

    assert_eq!(first, second);
    assert_eq!(network.input_to_hidden.flat(), weights_before);
}

#[test]
fn evaluate_accuracy_of_empty_dataset_is_zero() {
    let mut network = learner(1);
    assert_eq!(evaluate_accuracy(&mut network, &[]), 0.0);
}

#[test]
#[should_panic(expected = "dataset must not be empty")]
fn train_loop_rejects_empty_dataset() {
    let mut network = learner(1);
    let mut monitor = ConvergenceMonitor::new();
    train_loop(&mut network, &[], &TrainConfig::default(), &mut monitor);
}

// ============================================================================
// Stop conditions
// ============================================================================

#[test]
fn epoch_budget_exhaustion_is_not_convergence() {
    let mut network = learner(9);
    let dataset = dog_dataset();
    let mut monitor = ConvergenceMonitor::new();
    let config = TrainConfig {
        max_epochs: 2,
        max_patience: 50,
        ..TrainConfig::default()
    };

    let outcome = train_loop(&mut network, &dataset, &config, &mut monitor);

    assert_eq!(outcome.stop_reason, StopReason::MaxEpochs);
    assert_eq!(outcome.epochs_run, 2);
    assert!(!outcome.converged());
}

#[test]
fn preset_stop_flag_cancels_before_any_update() {
    let mut network = learner(21);
    let dataset = dog_dataset();
    let mut monitor = ConvergenceMonitor::new();

    let flag = Arc::new(AtomicBool::new(false));
    flag.store(true, Ordering::Relaxed);
    let config = TrainConfig {
        stop_flag: Some(Arc::clone(&flag)),
        ..TrainConfig::default()
    };

    let weights_before = (
        network.input_to_hidden.flat(),
        network.hidden_to_output.flat(),
    );
    let outcome = train_loop(&mut network, &dataset, &config, &mut monitor);

    assert_eq!(outcome.stop_reason, StopReason::Cancelled);
    assert_eq!(outcome.epochs_run, 0);
    assert_eq!(
        (
            network.input_to_hidden.flat(),
            network.hidden_to_output.flat(),
        ),
        weights_before,
        "cancellation before the first epoch must not touch weights"
    );
}

// ============================================================================
// Progress channel
// ============================================================================

#[test]
fn progress_channel_receives_checkpoint_stats() {
    let mut network = learner(33);
    let dataset = dog_dataset();
    let mut monitor = ConvergenceMonitor::new();

    let (tx, rx) = mpsc::channel();
    let config = TrainConfig {
        max_epochs: 30,
        max_patience: 50,
        progress_tx: Some(tx),
        ..TrainConfig::default()
    };

    train_loop(&mut network, &dataset, &config, &mut monitor);
    drop(config);

    let stats: Vec<_> = rx.iter().collect();
    assert!(!stats.is_empty(), "at least the epoch-1 checkpoint must report");
    assert_eq!(stats[0].epoch, 1);
    for pair in stats.windows(2) {
        assert!(pair[0].epoch < pair[1].epoch);
    }
    for s in &stats {
        assert_eq!(s.max_epochs, 30);
        assert!((0.0..=1.0).contains(&s.accuracy));
        assert!(s.loss.is_finite());
        assert!(s.learning_rate > 0.0);
        assert!(s.weight_magnitude.is_finite());
    }
}

#[test]
fn dropped_receiver_cancels_at_the_first_checkpoint() {
    let mut network = learner(55);
    let dataset = dog_dataset();
    let mut monitor = ConvergenceMonitor::new();

    let (tx, rx) = mpsc::channel();
    drop(rx);
    let config = TrainConfig {
        progress_tx: Some(tx),
        ..TrainConfig::default()
    };

    let outcome = train_loop(&mut network, &dataset, &config, &mut monitor);

    assert_eq!(outcome.stop_reason, StopReason::Cancelled);
    assert_eq!(outcome.epochs_run, 1);
    assert!(network.weights_finite());
}
