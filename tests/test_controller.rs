//! Tests for the adaptive learning-rate controller: warmup window, the
//! four policy branches, clamping and the anti-stagnation measure.

use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;
use woof_nn::train::AdaptiveController;
use woof_nn::{Network, NetworkConfig, TrainConfig};

const INITIAL_LR: f64 = 0.3;

fn controller() -> (AdaptiveController, TrainConfig) {
    let config = TrainConfig::default();
    (AdaptiveController::new(INITIAL_LR, &config), config)
}

// ============================================================================
// Warmup and policy branches
// ============================================================================

#[test]
fn rate_is_untouched_until_the_trend_window_fills() {
    let (mut ctrl, _) = controller();
    for acc in [0.2, 0.3, 0.4, 0.5] {
        ctrl.observe(acc);
        assert_eq!(ctrl.learning_rate(), INITIAL_LR);
    }
}

#[test]
fn high_accuracy_switches_to_fine_tuning_decay() {
    let (mut ctrl, _) = controller();
    for acc in [0.95, 0.96, 0.96, 0.97, 0.98] {
        ctrl.observe(acc);
    }
    assert_relative_eq!(ctrl.learning_rate(), INITIAL_LR * 0.95, epsilon = 1e-12);

    ctrl.observe(0.98);
    assert_relative_eq!(
        ctrl.learning_rate(),
        INITIAL_LR * 0.95 * 0.95,
        epsilon = 1e-12
    );
}

#[test]
fn low_but_improving_accuracy_keeps_the_rate_aggressive() {
    let (mut ctrl, _) = controller();
    for acc in [0.1, 0.2, 0.3, 0.4, 0.5] {
        ctrl.observe(acc);
    }
    // Early-training branch: no decay while accuracy is still below 0.7.
    assert_eq!(ctrl.learning_rate(), INITIAL_LR);
}

#[test]
fn mid_accuracy_applies_standard_decay() {
    let (mut ctrl, config) = controller();
    for acc in [0.70, 0.73, 0.76, 0.79, 0.82] {
        ctrl.observe(acc);
    }
    assert_relative_eq!(
        ctrl.learning_rate(),
        INITIAL_LR * config.learning_rate_decay,
        epsilon = 1e-12
    );
}

#[test]
fn plateau_boost_restores_the_rate_up_to_the_initial_value() {
    let (mut ctrl, _) = controller();
    // Flat mid-range accuracy: a couple of decays, then once the
    // stagnation streak passes the threshold the boost kicks in and the
    // cap pins the rate back at the initial value.
    for _ in 0..12 {
        ctrl.observe(0.8);
    }
    assert_relative_eq!(ctrl.learning_rate(), INITIAL_LR, epsilon = 1e-12);
}

// ============================================================================
// Clamping
// ============================================================================

#[test]
fn fine_tuning_decay_bottoms_out_at_the_minimum_rate() {
    let (mut ctrl, config) = controller();
    for _ in 0..200 {
        ctrl.observe(0.96);
    }
    assert_relative_eq!(
        ctrl.learning_rate(),
        config.min_learning_rate,
        epsilon = 1e-12
    );
}

#[test]
fn rate_never_exceeds_the_initial_value() {
    let (mut ctrl, _) = controller();
    for _ in 0..50 {
        ctrl.observe(0.8);
        assert!(ctrl.learning_rate() <= INITIAL_LR);
    }
}

// ============================================================================
// Stagnation tracking and the perturbation measure
// ============================================================================

#[test]
fn stagnation_counter_resets_on_improvement() {
    let (mut ctrl, _) = controller();
    ctrl.observe(0.5);
    ctrl.observe(0.5);
    ctrl.observe(0.5);
    assert_eq!(ctrl.stagnation_counter(), 2);

    ctrl.observe(0.6);
    assert_eq!(ctrl.stagnation_counter(), 0);
}

#[test]
fn perturbation_is_due_at_multiples_of_the_stagnation_threshold() {
    let (mut ctrl, config) = controller();
    ctrl.observe(0.5);
    assert!(!ctrl.perturbation_due());

    for step in 1..=3 * config.stagnation_threshold {
        ctrl.observe(0.5);
        assert_eq!(ctrl.stagnation_counter(), step);
        let expected = step % config.stagnation_threshold == 0;
        assert_eq!(
            ctrl.perturbation_due(),
            expected,
            "streak {step}: perturbation_due should be {expected}"
        );
    }
}

#[test]
fn anti_stagnation_perturbs_weights_and_resets_momentum() {
    let (mut ctrl, config) = controller();
    let mut network = Network::seeded(
        NetworkConfig {
            learning_rate: INITIAL_LR,
            ..NetworkConfig::default()
        },
        19,
    );
    // Give the momentum buffers something to reset.
    network.forward(&[0.9, 0.9, 0.1, 0.1]);
    network.backward(&[1.0, 0.0]);

    let weights_before = network.input_to_hidden.flat();
    let mut rng = StdRng::seed_from_u64(99);
    ctrl.apply_anti_stagnation(&mut network, config.perturbation_scale, &mut rng);

    assert_ne!(network.input_to_hidden.flat(), weights_before);
    assert!(network
        .momentum_input_to_hidden
        .flat()
        .iter()
        .chain(network.momentum_hidden_to_output.flat().iter())
        .all(|&m| m == 0.0));

    let bound = network.config.weight_bound;
    assert!(network
        .input_to_hidden
        .flat()
        .iter()
        .chain(network.hidden_to_output.flat().iter())
        .all(|w| w.abs() <= bound));

    assert!(ctrl.learning_rate() <= INITIAL_LR);
    assert!(ctrl.learning_rate() >= config.min_learning_rate);
}
