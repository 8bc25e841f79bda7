use woof_nn::{
    dog_dataset, evaluate_accuracy, train_loop, ConvergenceMonitor, Network, NetworkConfig,
    TrainConfig,
};

fn main() {
    let dataset = dog_dataset();
    let mut network = Network::new(NetworkConfig {
        learning_rate: 0.3,
        ..NetworkConfig::default()
    });
    let mut monitor = ConvergenceMonitor::new();

    println!("Training on {} examples (dog vs not-dog)...", dataset.len());
    let outcome = train_loop(&mut network, &dataset, &TrainConfig::default(), &mut monitor);

    println!(
        "Stopped after {} epochs ({:?}): loss {:.4}, accuracy {:.1}%",
        outcome.epochs_run,
        outcome.stop_reason,
        outcome.final_loss,
        outcome.final_accuracy * 100.0
    );

    for example in &dataset {
        let output = network.forward(&example.input);
        let predicted = if output[0] > output[1] { "dog" } else { "not-dog" };
        let actual = if example.is_dog { "dog" } else { "not-dog" };
        let mark = if predicted == actual { "ok" } else { "MISS" };
        println!(
            "  {:<6} p(dog)={:.3} -> {} ({}) {}",
            example.label, output[0], predicted, actual, mark
        );
    }

    let accuracy = evaluate_accuracy(&mut network, &dataset);
    println!("Final accuracy: {:.1}%", accuracy * 100.0);
    for warning in monitor.warnings() {
        println!("note: {warning}");
    }
}
