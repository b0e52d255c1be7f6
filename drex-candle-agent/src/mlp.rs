//! Multilayer perceptron.
mod base;
mod config;
pub use base::Mlp;
use candle_core::Tensor;
pub use config::{Activation, MlpConfig};

impl Activation {
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        match self {
            Self::ReLU => xs.relu(),
            Self::Tanh => xs.tanh(),
        }
    }
}
