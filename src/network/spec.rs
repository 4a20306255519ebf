use serde::{Serialize, Deserialize};

use crate::activation::activation::ActivationFunction;
use crate::error::Result;
use crate::network::architecture::{Architecture, NetType, DEFAULT_CORRUPTION_LEVEL};

/// A fully serializable description of a network and its training settings.
///
/// `NetworkSpec` can be saved to / loaded from JSON independently of the
/// trained weights, so a configuration can be stored before training starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkSpec {
    /// Human-readable name used as the model file stem.
    pub name: String,
    /// Layer widths, input first (e.g. `[n_in, n_hidden, n_out]`).
    pub structure: Vec<usize>,
    pub net_type: NetType,
    #[serde(default)]
    pub activation: ActivationFunction,
    #[serde(default = "default_learning_rate")]
    pub learning_rate: f64,
    #[serde(default)]
    pub momentum: f64,
    #[serde(default)]
    pub denoising: bool,
    #[serde(default = "default_corruption_level")]
    pub corruption_level: f64,
    /// Fixed seed for weight initialisation and corruption noise.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_learning_rate() -> f64 {
    0.1
}

fn default_corruption_level() -> f64 {
    DEFAULT_CORRUPTION_LEVEL
}

impl NetworkSpec {
    pub fn new(name: &str, structure: Vec<usize>, net_type: NetType) -> NetworkSpec {
        NetworkSpec {
            name: name.to_string(),
            structure,
            net_type,
            activation: ActivationFunction::default(),
            learning_rate: default_learning_rate(),
            momentum: 0.0,
            denoising: false,
            corruption_level: DEFAULT_CORRUPTION_LEVEL,
            seed: None,
        }
    }

    /// Builds a freshly initialised network with these settings applied.
    pub fn build(&self) -> Result<Architecture> {
        let mut arch = match self.seed {
            Some(seed) => Architecture::with_seed(self.structure.clone(), self.net_type, self.activation, seed)?,
            None => Architecture::new(self.structure.clone(), self.net_type, self.activation)?,
        };
        arch.set_learning(self.learning_rate);
        arch.set_momentum(self.momentum);
        arch.set_corruption_level(self.corruption_level)?;
        if self.denoising {
            arch.make_denoising();
        }
        Ok(arch)
    }

    /// Serializes the spec to a pretty-printed JSON file.
    pub fn save_json(&self, path: &str) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a `NetworkSpec` from a JSON file.
    pub fn load_json(path: &str) -> Result<NetworkSpec> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_json_uses_defaults() {
        let spec: NetworkSpec = serde_json::from_str(
            r#"{ "name": "dae", "structure": [4, 2, 4], "net_type": "autoencoder", "denoising": true }"#,
        ).unwrap();
        assert_eq!(spec.activation, ActivationFunction::Sigmoid);
        assert_eq!(spec.learning_rate, 0.1);
        assert_eq!(spec.seed, None);

        let arch = spec.build().unwrap();
        assert!(arch.is_denoising());
        assert_eq!(arch.structure(), &[4, 2, 4]);
        assert_eq!(arch.net_type(), NetType::Autoencoder);
    }

    #[test]
    fn seeded_specs_build_identical_networks() {
        let mut spec = NetworkSpec::new("reg", vec![3, 5, 1], NetType::Regression);
        spec.seed = Some(9);
        spec.momentum = 0.3;
        let a = spec.build().unwrap();
        let b = spec.build().unwrap();
        assert_eq!(a.layers()[0].weights, b.layers()[0].weights);
        assert_eq!(a.momentum(), 0.3);
    }

    #[test]
    fn invalid_corruption_level_fails_build() {
        let mut spec = NetworkSpec::new("dae", vec![3, 2, 3], NetType::Autoencoder);
        spec.corruption_level = -0.1;
        assert!(spec.build().is_err());
    }
}
