use std::time::Instant;

use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Serialize, Deserialize};

use crate::{
    activation::activation::ActivationFunction,
    error::{NnError, Result},
    layers::dense::Layer,
    loss::mse::MseLoss,
    optim::sgd::Sgd,
    train::{epoch_stats::EpochStats, train_config::EncodeConfig},
};

/// How the network output is interpreted downstream. The engine math is the
/// same for every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetType {
    Regression,
    Classification,
    Autoencoder,
}

/// Training regime for `encode`. The only transition is
/// `Standard -> Denoising`, via `Architecture::make_denoising`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoiseMode {
    Standard,
    Denoising,
}

pub const DEFAULT_CORRUPTION_LEVEL: f64 = 0.25;

fn entropy_rng() -> StdRng {
    StdRng::from_entropy()
}

/// A stack of fully-connected layers sized by a structure vector such as
/// `[n_in, n_hidden, n_out]`.
///
/// All layers share one activation function and one `Sgd` setting
/// (learning rate + momentum). `backpropagate` is the training primitive;
/// `encode` runs the (optionally denoising) autoencoder loop on top of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Architecture {
    layers: Vec<Layer>,
    structure: Vec<usize>,
    net_type: NetType,
    activation: ActivationFunction,
    optimizer: Sgd,
    mode: NoiseMode,
    corruption_level: f64,
    reconstruction_error: Vec<f64>,
    #[serde(skip, default = "entropy_rng")]
    rng: StdRng,
}

impl Architecture {
    /// Builds `structure.len() - 1` layers with Xavier-initialised weights.
    pub fn new(structure: Vec<usize>, net_type: NetType, activation: ActivationFunction) -> Result<Architecture> {
        Architecture::from_rng(structure, net_type, activation, entropy_rng())
    }

    /// Same as `new`, with reproducible initialisation and corruption noise.
    pub fn with_seed(
        structure: Vec<usize>,
        net_type: NetType,
        activation: ActivationFunction,
        seed: u64,
    ) -> Result<Architecture> {
        Architecture::from_rng(structure, net_type, activation, StdRng::seed_from_u64(seed))
    }

    fn from_rng(
        structure: Vec<usize>,
        net_type: NetType,
        activation: ActivationFunction,
        mut rng: StdRng,
    ) -> Result<Architecture> {
        if structure.len() < 2 {
            return Err(NnError::StructureTooShort(structure.len()));
        }
        if let Some(idx) = structure.iter().position(|&n| n == 0) {
            return Err(NnError::EmptyLayer(idx));
        }

        let layers = structure.windows(2)
            .map(|pair| Layer::new(pair[1], pair[0], activation, &mut rng))
            .collect();

        log::debug!("built {:?} network {:?} with {:?} activation", net_type, structure, activation);

        Ok(Architecture {
            layers,
            structure,
            net_type,
            activation,
            optimizer: Sgd::default(),
            mode: NoiseMode::Standard,
            corruption_level: DEFAULT_CORRUPTION_LEVEL,
            reconstruction_error: Vec::new(),
            rng,
        })
    }

    /// Pure forward pass; network parameters and caches are left untouched.
    pub fn test(&self, event: &[f64]) -> Result<Vec<f64>> {
        self.check_event(event)?;
        let mut current = event.to_vec();
        for layer in &self.layers {
            current = layer.evaluate(&current)?;
        }
        Ok(current)
    }

    /// Forward pass over `event` followed by one backward pass of `error`
    /// (∂L/∂output) through every layer, last to first.
    ///
    /// `weight` scales the error entering the output layer, so it multiplies
    /// every parameter update of this step.
    pub fn backpropagate(&mut self, error: &[f64], event: &[f64], weight: f64) -> Result<()> {
        self.forward(event)?;
        self.propagate_error(error, weight)
    }

    /// Forward pass that caches per-layer activations for `propagate_error`.
    pub(crate) fn forward(&mut self, event: &[f64]) -> Result<Vec<f64>> {
        self.check_event(event)?;
        let mut current = event.to_vec();
        for layer in &mut self.layers {
            current = layer.feed_from(&current)?;
        }
        Ok(current)
    }

    pub(crate) fn propagate_error(&mut self, error: &[f64], weight: f64) -> Result<()> {
        let n_out = self.output_size();
        if error.len() != n_out {
            return Err(NnError::DimensionMismatch {
                context: "output error",
                expected: n_out,
                actual: error.len(),
            });
        }

        let mut signal: Vec<f64> = error.iter().map(|e| e * weight).collect();
        for layer in self.layers.iter_mut().rev() {
            signal = self.optimizer.step(layer, &signal)?;
        }
        Ok(())
    }

    fn check_event(&self, event: &[f64]) -> Result<()> {
        if event.len() != self.structure[0] {
            return Err(NnError::DimensionMismatch {
                context: "network input",
                expected: self.structure[0],
                actual: event.len(),
            });
        }
        Ok(())
    }

    pub fn set_learning(&mut self, x: f64) {
        self.optimizer.learning_rate = x;
    }

    pub fn set_momentum(&mut self, x: f64) {
        self.optimizer.momentum = x;
    }

    /// Decays the learning rate by the factor `x`.
    pub fn anneal(&mut self, x: f64) {
        self.optimizer.anneal(x);
        log::debug!("learning rate annealed by {x} to {}", self.optimizer.learning_rate);
    }

    pub fn learning_rate(&self) -> f64 {
        self.optimizer.learning_rate
    }

    pub fn momentum(&self) -> f64 {
        self.optimizer.momentum
    }

    /// Switches `encode` to denoising mode. There is no way back.
    pub fn make_denoising(&mut self) {
        if self.mode == NoiseMode::Standard {
            log::info!("network {:?} switched to denoising mode", self.structure);
        }
        self.mode = NoiseMode::Denoising;
    }

    pub fn is_denoising(&self) -> bool {
        self.mode == NoiseMode::Denoising
    }

    pub fn mode(&self) -> NoiseMode {
        self.mode
    }

    /// Probability with which each feature is zeroed in denoising mode.
    pub fn set_corruption_level(&mut self, level: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&level) {
            return Err(NnError::InvalidConfig(format!(
                "corruption level {level} outside [0, 1]"
            )));
        }
        self.corruption_level = level;
        Ok(())
    }

    pub fn corruption_level(&self) -> f64 {
        self.corruption_level
    }

    /// Trains the network to reproduce `inputs` for `config.epochs` passes.
    ///
    /// In denoising mode every input is corrupted before it is fed forward,
    /// while the error is taken against the clean input. Each epoch's mean
    /// reconstruction error is appended to `reconstruction_history` and, if a
    /// progress channel is configured, reported as `EpochStats`. Returns the
    /// last epoch's mean reconstruction error.
    pub fn encode(&mut self, inputs: &[Vec<f64>], weights: &[f64], config: &EncodeConfig) -> Result<f64> {
        if inputs.is_empty() {
            return Err(NnError::EmptyInput("encode inputs"));
        }
        if inputs.len() != weights.len() {
            return Err(NnError::LengthMismatch {
                context: "encode inputs and weights",
                left: inputs.len(),
                right: weights.len(),
            });
        }
        if self.input_size() != self.output_size() {
            return Err(NnError::NotAutoencoder {
                inputs: self.input_size(),
                outputs: self.output_size(),
            });
        }
        if config.epochs == 0 {
            return Err(NnError::InvalidConfig("encode needs at least one epoch".into()));
        }

        self.set_learning(config.learning_rate);
        let mut last_error = 0.0;

        for epoch in 1..=config.epochs {
            let t_start = Instant::now();
            let mut total = 0.0;

            for (input, &weight) in inputs.iter().zip(weights) {
                let fed = match self.mode {
                    NoiseMode::Denoising => self.corrupt(input),
                    NoiseMode::Standard => input.clone(),
                };
                let output = self.forward(&fed)?;
                total += MseLoss::loss(&output, input);
                let error = MseLoss::derivative(&output, input);
                self.propagate_error(&error, weight)?;
            }

            last_error = total / inputs.len() as f64;
            self.reconstruction_error.push(last_error);

            let stats = EpochStats {
                epoch,
                total_epochs: config.epochs,
                reconstruction_error: last_error,
                learning_rate: self.optimizer.learning_rate,
                elapsed_ms: t_start.elapsed().as_millis() as u64,
            };
            log::debug!("encode epoch {}/{}: reconstruction error {:.6}", epoch, config.epochs, last_error);

            if let Some(ref tx) = config.progress_tx {
                if tx.send(stats).is_err() {
                    log::debug!("progress receiver dropped at epoch {epoch}");
                }
            }
        }

        Ok(last_error)
    }

    /// Masking noise: each feature is zeroed with probability `corruption_level`.
    fn corrupt(&mut self, input: &[f64]) -> Vec<f64> {
        let p = self.corruption_level;
        let rng = &mut self.rng;
        input.iter()
            .map(|&x| if rng.gen_bool(p) { 0.0 } else { x })
            .collect()
    }

    pub fn reconstruction_history(&self) -> &[f64] {
        &self.reconstruction_error
    }

    pub fn structure(&self) -> &[usize] {
        &self.structure
    }

    pub fn input_size(&self) -> usize {
        self.structure[0]
    }

    pub fn output_size(&self) -> usize {
        self.structure[self.structure.len() - 1]
    }

    pub fn net_type(&self) -> NetType {
        self.net_type
    }

    pub fn activation(&self) -> ActivationFunction {
        self.activation
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layers_mut(&mut self) -> &mut [Layer] {
        &mut self.layers
    }

    /// Serializes the network weights and settings to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a network previously written by `save_json`.
    pub fn load_json(path: &str) -> Result<Architecture> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let arch: Architecture = serde_json::from_reader(reader)?;
        arch.validate()?;
        Ok(arch)
    }

    fn validate(&self) -> Result<()> {
        if self.structure.len() < 2 {
            return Err(NnError::StructureTooShort(self.structure.len()));
        }
        if self.layers.len() != self.structure.len() - 1 {
            return Err(NnError::InvalidConfig(format!(
                "{} layers stored for structure {:?}",
                self.layers.len(),
                self.structure
            )));
        }
        for (layer, pair) in self.layers.iter().zip(self.structure.windows(2)) {
            if layer.input_size != pair[0]
                || layer.size != pair[1]
                || layer.weights.rows != pair[1]
                || layer.weights.cols != pair[0]
                || !layer.weights.is_rectangular()
                || layer.biases.len() != pair[1]
            {
                return Err(NnError::InvalidConfig(format!(
                    "layer shape {}x{} does not match structure {:?}",
                    layer.weights.rows, layer.weights.cols, self.structure
                )));
            }
            if layer.activator != self.activation {
                return Err(NnError::InvalidConfig(format!(
                    "layer activation {:?} differs from network activation {:?}",
                    layer.activator, self.activation
                )));
            }
        }
        if !(0.0..=1.0).contains(&self.corruption_level) {
            return Err(NnError::InvalidConfig(format!(
                "corruption level {} outside [0, 1]",
                self.corruption_level
            )));
        }
        Ok(())
    }
}
