//! Tests for the forward propagation engine: determinism, probability
//! output, activation side effects and NaN containment.

use approx::assert_abs_diff_eq;
use woof_nn::{Network, NetworkConfig};

fn seeded_network() -> Network {
    Network::seeded(NetworkConfig::default(), 42)
}

#[test]
fn forward_is_deterministic_for_fixed_weights() {
    let mut network = seeded_network();
    let input = [0.9, 0.9, 0.1, 0.1];
    let first = network.forward(&input);
    let second = network.forward(&input);
    assert_eq!(first, second);
}

#[test]
fn forward_output_is_a_probability_distribution() {
    let mut network = seeded_network();
    let output = network.forward(&[0.5, 0.2, 0.8, 0.1]);
    assert_eq!(output.len(), 2);
    assert_abs_diff_eq!(output.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
    assert!(output.iter().all(|p| (0.0..=1.0).contains(p)));
}

#[test]
fn forward_stores_activations_for_backprop() {
    let mut network = seeded_network();
    let input = [0.7, 0.8, 0.3, 0.2];
    let output = network.forward(&input);

    assert_eq!(network.activations.input, input.to_vec());
    assert_eq!(network.activations.hidden.len(), 4);
    assert_eq!(network.activations.output, output);

    // Hidden activations must agree with a manual recomputation.
    for h in 0..4 {
        let sum: f64 = (0..4)
            .map(|i| input[i] * network.input_to_hidden.data[h][i])
            .sum();
        let expected = network.config.hidden_activation.apply(sum);
        assert_abs_diff_eq!(network.activations.hidden[h], expected, epsilon = 1e-12);
    }
}

#[test]
#[should_panic(expected = "input vector length")]
fn forward_rejects_mismatched_input_length() {
    let mut network = seeded_network();
    network.forward(&[0.1, 0.2]);
}

#[test]
fn forward_contains_nan_inputs() {
    let mut network = seeded_network();
    let output = network.forward(&[f64::NAN, 0.5, 0.5, 0.5]);

    assert!(output.iter().all(|p| p.is_finite()));
    assert!(network.activations.hidden.iter().all(|a| a.is_finite()));
    assert!(network.nan_events() > 0);
}

#[test]
fn forward_handles_infinite_inputs_without_poisoning_state() {
    let mut network = seeded_network();
    let output = network.forward(&[f64::INFINITY, 0.0, 0.0, 0.0]);

    assert!(output.iter().all(|p| p.is_finite()));
    assert_abs_diff_eq!(output.iter().sum::<f64>(), 1.0, epsilon = 1e-9);
    assert!(network.weights_finite());
}

#[test]
fn seeded_networks_are_reproducible() {
    let mut a = Network::seeded(NetworkConfig::default(), 7);
    let mut b = Network::seeded(NetworkConfig::default(), 7);
    let input = [0.2, 0.8, 0.3, 0.7];
    assert_eq!(a.forward(&input), b.forward(&input));
}

#[test]
fn saved_network_reloads_with_identical_behavior() {
    let mut network = seeded_network();
    network.forward(&[0.9, 0.9, 0.1, 0.1]);
    network.backward(&[1.0, 0.0]);

    let path = std::env::temp_dir().join(format!("woof-nn-test-{}.json", std::process::id()));
    let path = path.to_str().unwrap().to_string();
    network.save_json(&path).unwrap();
    let mut reloaded = Network::load_json(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert_eq!(reloaded.config, network.config);
    let input = [0.7, 0.8, 0.3, 0.2];
    assert_eq!(reloaded.forward(&input), network.forward(&input));
}

#[test]
fn reinitialize_resets_learning_state() {
    let mut network = seeded_network();
    network.forward(&[0.9, 0.9, 0.1, 0.1]);
    network.backward(&[1.0, 0.0]);

    let mut rng = rand::thread_rng();
    network.reinitialize(&mut rng);

    assert_eq!(network.nan_events(), 0);
    assert!(network
        .momentum_input_to_hidden
        .flat()
        .iter()
        .all(|&m| m == 0.0));
    assert!(network
        .momentum_hidden_to_output
        .flat()
        .iter()
        .all(|&m| m == 0.0));
    assert!(network.weights_finite());
}
