use serde::{Serialize, Deserialize};

use crate::{error::Result, layers::dense::Layer};

/// Learning-rate and momentum settings shared by every layer of a network.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sgd {
    pub learning_rate: f64,
    pub momentum: f64,
}

impl Sgd {
    pub fn new(learning_rate: f64) -> Sgd {
        Sgd { learning_rate, momentum: 0.0 }
    }

    pub fn with_momentum(learning_rate: f64, momentum: f64) -> Sgd {
        Sgd { learning_rate, momentum }
    }

    /// Multiplies the learning rate by `factor`.
    pub fn anneal(&mut self, factor: f64) {
        self.learning_rate *= factor;
    }

    /// Runs one backward step through `layer` with the current settings.
    pub fn step(&self, layer: &mut Layer, error: &[f64]) -> Result<Vec<f64>> {
        layer.backward(error, self.learning_rate, self.momentum)
    }
}

impl Default for Sgd {
    fn default() -> Self {
        Sgd::new(0.1)
    }
}
