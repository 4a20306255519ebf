use std::sync::mpsc;

use rand::{rngs::StdRng, Rng, SeedableRng};

use flavnet::{
    ActivationFunction, Dataset, EncodeConfig, NetType, NetworkSpec, TableSource,
};

/// Toy jets: light dominates, bottom and charm are rare and harder in pT.
fn toy_jets(n: usize, rng: &mut StdRng) -> flavnet::Result<TableSource> {
    let mut pt = Vec::with_capacity(n);
    let mut eta = Vec::with_capacity(n);
    let mut ip3d = Vec::with_capacity(n);
    let mut sv_mass = Vec::with_capacity(n);
    let (mut light, mut charm, mut bottom) = (Vec::new(), Vec::new(), Vec::new());

    for _ in 0..n {
        let roll: f64 = rng.gen();
        let (l, c, b) = if roll < 0.8 { (1, 0, 0) } else if roll < 0.9 { (0, 1, 0) } else { (0, 0, 1) };
        let hardness = if b == 1 { 2.0 } else if c == 1 { 1.5 } else { 1.0 };
        pt.push(20.0 + rng.gen::<f64>() * 150.0 * hardness);
        eta.push(rng.gen_range(-2.6..2.6));
        ip3d.push((rng.gen::<f32>() - 0.5) * hardness as f32);
        sv_mass.push(rng.gen::<f32>() * hardness as f32);
        light.push(l);
        charm.push(c);
        bottom.push(b);
    }

    TableSource::new()
        .with_doubles("pt", pt)?
        .with_doubles("eta", eta)?
        .with_floats("ip3d", ip3d)?
        .with_floats("sv_mass", sv_mass)?
        .with_ints("light", light)?
        .with_ints("charm", charm)?
        .with_ints("bottom", bottom)
}

fn main() -> flavnet::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, "info"),
    )
    .init();

    let mut rng = StdRng::seed_from_u64(2015);
    let mut dataset = Dataset::new(toy_jets(5000, &mut rng)?);

    let mut failures = dataset.bind_inputs(&[("ip3d", "float"), ("sv_mass", "float"), ("pt", "double")]);
    failures.extend(dataset.bind_controls(&[("eta", "double"), ("light", "int"), ("charm", "int"), ("bottom", "int")]));
    for (name, err) in &failures {
        println!("skipping {name}: {err}");
    }

    dataset.reweight_config_mut().sample_fraction = 1.0;
    let table = dataset.determine_reweighting(false, false)?;
    println!("bottom correction, first pT bin: {:?}", table.bottom_correction()[0]);

    let mut inputs = Vec::new();
    let mut weights = Vec::new();
    for i in 0..dataset.num_entries() {
        dataset.at(i)?;
        let mut x = dataset.input()?;
        x[2] /= 500.0;
        inputs.push(x);
        weights.push(dataset.get_physics_reweighting()?);
    }

    let mut spec = NetworkSpec::new("toy-dae", vec![3, 2, 3], NetType::Autoencoder);
    spec.activation = ActivationFunction::Tanh;
    spec.denoising = true;
    spec.momentum = 0.3;
    spec.seed = Some(11);
    let mut network = spec.build()?;

    let (tx, rx) = mpsc::channel();
    let config = EncodeConfig::new(0.01).epochs(10).verbose(tx);
    network.encode(&inputs, &weights, &config)?;
    drop(config);

    for stats in rx {
        println!(
            "Epoch {}/{}: reconstruction error = {:.6} ({} ms)",
            stats.epoch, stats.total_epochs, stats.reconstruction_error, stats.elapsed_ms
        );
    }
    Ok(())
}
