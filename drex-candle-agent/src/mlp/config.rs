use serde::{Deserialize, Serialize};

/// Activation function of hidden layers.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone, Copy)]
pub enum Activation {
    /// Rectified linear unit.
    ReLU,

    /// Hyperbolic tangent.
    Tanh,
}

#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
/// Configuration of [`Mlp`](super::Mlp).
pub struct MlpConfig {
    pub(super) in_dim: usize,
    pub(super) units: Vec<usize>,
    pub(super) activation: Activation,
}

impl MlpConfig {
    /// Creates configuration of MLP.
    ///
    /// * `units` - Number of units in each hidden layer.
    /// * `activation` - Activation function applied after every layer.
    pub fn new(in_dim: usize, units: Vec<usize>, activation: Activation) -> Self {
        Self {
            in_dim,
            units,
            activation,
        }
    }

    /// Number of output features.
    pub fn out_dim(&self) -> usize {
        self.units.last().copied().unwrap_or(self.in_dim)
    }
}
