// The binary only sets up logging and points at the demos.
// All network and reweighting logic lives in the library (src/lib.rs).
// Run demos with:
//   cargo run --example xor
//   cargo run --example denoising
use flavnet::{ActivationFunction, Architecture, NetType};

fn main() {
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    )
    .init();

    match Architecture::new(vec![2, 3, 1], NetType::Regression, ActivationFunction::Sigmoid) {
        Ok(arch) => log::info!("flavnet ready; sample network structure {:?}", arch.structure()),
        Err(e) => log::error!("could not build sample network: {e}"),
    }
    println!("flavnet: feed-forward networks and flavor reweighting for jet tagging.");
    println!("Run `cargo run --example xor` or `cargo run --example denoising` for demos.");
}
