use flavnet::{train_network, ActivationFunction, Architecture, NetType};

fn main() -> flavnet::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    )
    .init();

    let mut network = Architecture::with_seed(vec![2, 3, 1], NetType::Regression, ActivationFunction::Sigmoid, 7)?;
    network.set_learning(0.5);
    network.set_momentum(0.5);

    let inputs = vec![
        vec![1.0, 0.0],
        vec![1.0, 1.0],
        vec![0.0, 1.0],
        vec![0.0, 0.0],
    ];
    let expected_outputs = vec![
        vec![1.0],
        vec![0.0],
        vec![1.0],
        vec![0.0],
    ];
    let weights = vec![1.0; inputs.len()];

    let epochs = 10000;

    for epoch in 0..epochs {
        let loss = train_network(&mut network, &inputs, &expected_outputs, &weights)?;
        if epoch % 1000 == 0 {
            println!("Epoch {epoch}: loss = {loss:.6}, learning rate = {:.4}", network.learning_rate());
            network.anneal(0.95);
        }
    }

    for input in &inputs {
        println!("Input: {:?} -> Output: {:.4}", input, network.test(input)?[0]);
    }
    Ok(())
}
