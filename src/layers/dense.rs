use rand::Rng;
use serde::{Serialize, Deserialize};

use crate::{
    activation::activation::ActivationFunction,
    error::{NnError, Result},
    math::matrix::Matrix,
};

/// One fully-connected stage: `activate(W·x + b)`.
///
/// `weights` is `size x input_size`. The last input, pre-activation and
/// output are cached by `feed_from` so that `backward` can compute the
/// gradient of the most recent forward pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer{
    pub size: usize,
    pub input_size: usize,
    pub weights: Matrix,
    pub biases: Vec<f64>,
    pub activator: ActivationFunction,
    #[serde(skip)]
    last_input: Vec<f64>,
    #[serde(skip)]
    pre_neurons: Vec<f64>,  // z = Wx + b, needed for the derivative
    #[serde(skip)]
    neurons: Vec<f64>,
    #[serde(skip)]
    weight_velocity: Matrix,
    #[serde(skip)]
    bias_velocity: Vec<f64>,
}

impl Layer {
    pub fn new<R: Rng + ?Sized>(
        size: usize,
        input_size: usize,
        activation: ActivationFunction,
        rng: &mut R,
    ) -> Layer {
        Layer {
            size,
            input_size,
            weights: Matrix::xavier(size, input_size, rng),
            biases: vec![0.0; size],
            activator: activation,
            last_input: Vec::new(),
            pre_neurons: Vec::new(),
            neurons: Vec::new(),
            weight_velocity: Matrix::zeros(size, input_size),
            bias_velocity: vec![0.0; size],
        }
    }

    /// Forward pass without touching the caches.
    pub fn evaluate(&self, input: &[f64]) -> Result<Vec<f64>> {
        let z = self.affine(input)?;
        Ok(self.activator.activate(&z))
    }

    /// Forward pass that records input, pre-activation and output for `backward`.
    pub fn feed_from(&mut self, input: &[f64]) -> Result<Vec<f64>> {
        let z = self.affine(input)?;
        let a = self.activator.activate(&z);
        self.last_input = input.to_vec();
        self.pre_neurons = z;
        self.neurons = a.clone();
        Ok(a)
    }

    fn affine(&self, input: &[f64]) -> Result<Vec<f64>> {
        let mut z = self.weights.mul_vec(input)?;
        for (zi, b) in z.iter_mut().zip(&self.biases) {
            *zi += b;
        }
        Ok(z)
    }

    /// Output of the most recent `feed_from`.
    pub fn neurons(&self) -> &[f64] {
        &self.neurons
    }

    /// Applies one gradient step for the cached forward pass and returns the
    /// error for the upstream layer.
    ///
    /// `error` is ∂L/∂a for this layer's output. The local delta is
    /// `error ⊙ σ'(z)`; the returned signal `Wᵗ·delta` uses the weights as
    /// they were before this update.
    pub fn backward(&mut self, error: &[f64], learning_rate: f64, momentum: f64) -> Result<Vec<f64>> {
        if error.len() != self.size {
            return Err(NnError::DimensionMismatch {
                context: "layer error signal",
                expected: self.size,
                actual: error.len(),
            });
        }
        if self.last_input.len() != self.input_size || self.pre_neurons.len() != self.size {
            return Err(NnError::DimensionMismatch {
                context: "cached layer input (no forward pass recorded)",
                expected: self.input_size,
                actual: self.last_input.len(),
            });
        }

        let delta: Vec<f64> = error.iter().zip(&self.pre_neurons)
            .map(|(e, &z)| e * self.activator.derivative(z))
            .collect();
        let upstream = self.weights.transpose_mul_vec(&delta)?;

        let weights_grad = Matrix::outer(&delta, &self.last_input);
        self.apply_gradients(weights_grad, &delta, learning_rate, momentum);

        Ok(upstream)
    }

    /// Classical momentum step: `v = momentum·v - lr·grad`, then `W += v`.
    fn apply_gradients(&mut self, weights_grad: Matrix, biases_grad: &[f64], lr: f64, momentum: f64) {
        // Velocity is not persisted; rebuild it after deserialization.
        if !self.weight_velocity.same_shape(&self.weights) {
            self.weight_velocity = Matrix::zeros(self.size, self.input_size);
        }
        if self.bias_velocity.len() != self.size {
            self.bias_velocity = vec![0.0; self.size];
        }

        self.weight_velocity = self.weight_velocity.map(|v| v * momentum) - weights_grad.map(|g| g * lr);
        self.weights = self.weights.clone() + self.weight_velocity.clone();

        for ((b, v), g) in self.biases.iter_mut().zip(self.bias_velocity.iter_mut()).zip(biases_grad) {
            *v = momentum * *v - lr * g;
            *b += *v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn identity_layer() -> Layer {
        let mut layer = Layer::new(1, 2, ActivationFunction::Identity, &mut StdRng::seed_from_u64(1));
        layer.weights = Matrix::from_data(vec![vec![0.5, -1.0]]);
        layer.biases = vec![0.25];
        layer
    }

    #[test]
    fn feed_from_computes_affine_then_activation() {
        let mut layer = identity_layer();
        let out = layer.feed_from(&[2.0, 1.0]).unwrap();
        assert_eq!(out, vec![0.25]);
        assert_eq!(layer.neurons(), &[0.25]);
        assert_eq!(layer.evaluate(&[2.0, 1.0]).unwrap(), out);
    }

    #[test]
    fn wrong_input_width_fails() {
        let mut layer = identity_layer();
        assert!(layer.feed_from(&[1.0]).is_err());
        assert!(layer.evaluate(&[1.0, 2.0, 3.0]).is_err());
    }

    #[test]
    fn backward_without_forward_fails() {
        let mut layer = identity_layer();
        assert!(matches!(
            layer.backward(&[1.0], 0.1, 0.0),
            Err(NnError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn backward_updates_with_plain_sgd_and_returns_pre_update_signal() {
        let mut layer = identity_layer();
        layer.feed_from(&[2.0, 1.0]).unwrap();
        let upstream = layer.backward(&[1.0], 0.1, 0.0).unwrap();

        assert_eq!(upstream, vec![0.5, -1.0]);
        assert!((layer.weights.data[0][0] - 0.3).abs() < 1e-12);
        assert!((layer.weights.data[0][1] - -1.1).abs() < 1e-12);
        assert!((layer.biases[0] - 0.15).abs() < 1e-12);
    }

    #[test]
    fn momentum_carries_previous_step() {
        let mut layer = identity_layer();
        layer.feed_from(&[1.0, 0.0]).unwrap();
        layer.backward(&[1.0], 0.1, 0.5).unwrap();
        let after_first = layer.weights.data[0][0];
        layer.feed_from(&[1.0, 0.0]).unwrap();
        layer.backward(&[1.0], 0.1, 0.5).unwrap();
        // second step: v = 0.5 * -0.1 - 0.1 = -0.15
        assert!((layer.weights.data[0][0] - (after_first - 0.15)).abs() < 1e-12);
    }
}
