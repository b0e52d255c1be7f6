//! Policy network.
use crate::{
    cnn::{Cnn, CnnConfig},
    mlp::{Activation, Mlp, MlpConfig},
    model::SubModel1,
};
use anyhow::Result;
use candle_core::Tensor;
use candle_nn::{linear, Init, Linear, Module, VarBuilder};
use drex_core::{error::DrexError, EnvType, Space};

const CNN_FEATURES: usize = 512;
const MLP_UNITS: [usize; 2] = [64, 64];

enum Trunk {
    Cnn(Cnn),
    Mlp(Mlp),
}

enum Head {
    Logits(Linear),
    Gaussian { mean: Linear, logstd: Tensor },
}

/// Output of [`PolicyNet`] for a batch of observations.
pub enum PolicyOutput {
    /// Unnormalized log-probabilities of discrete actions, `[batch, n]`.
    Logits(Tensor),

    /// Diagonal Gaussian over continuous actions, each `[batch, dim]`.
    Gaussian {
        /// Mean.
        mean: Tensor,
        /// Standard deviation.
        std: Tensor,
    },
}

/// Feature extractor followed by an action head.
///
/// The feature extractor is the Nature CNN for atari and a `tanh` MLP with two
/// hidden layers of 64 units for mujoco. Discrete action spaces get a logits
/// head; continuous ones get a mean head and a state-independent log standard
/// deviation. Parameters are named under the `pi` prefix.
pub struct PolicyNet {
    trunk: Trunk,
    head: Head,
}

impl PolicyNet {
    /// Builds the network for observations of shape `obs_shape` (without the
    /// batch axis).
    pub fn build(
        vb: VarBuilder,
        env_type: EnvType,
        obs_shape: &[usize],
        action_space: &Space,
    ) -> Result<Self> {
        let vb = vb.pp("pi");

        let (trunk, n_features) = match env_type {
            EnvType::Atari => {
                if let Space::Box { .. } = action_space {
                    return Err(DrexError::config(
                        "atari policies require a discrete action space",
                    )
                    .into());
                }
                let (c, h, w) = match obs_shape {
                    [c, h, w] => (*c, *h, *w),
                    _ => {
                        return Err(DrexError::config(format!(
                            "atari policies require [channel, height, width] observations, got {:?}",
                            obs_shape
                        ))
                        .into())
                    }
                };
                let config = CnnConfig::new(c, h, w, CNN_FEATURES);
                let n_features = config.out_dim();
                (Trunk::Cnn(Cnn::build(vb.pp("cnn"), config)?), n_features)
            }
            EnvType::Mujoco => {
                let in_dim = obs_shape.iter().product();
                let config = MlpConfig::new(in_dim, MLP_UNITS.to_vec(), Activation::Tanh);
                let n_features = config.out_dim();
                (Trunk::Mlp(Mlp::build(vb.pp("mlp"), config)?), n_features)
            }
        };

        let head = match action_space {
            Space::Discrete { n } => Head::Logits(linear(n_features, *n as usize, vb.pp("logits"))?),
            Space::Box { .. } => {
                let dim = action_space.dim();
                Head::Gaussian {
                    mean: linear(n_features, dim, vb.pp("mean"))?,
                    logstd: vb.get_with_hints((1, dim), "logstd", Init::Const(0.0))?,
                }
            }
        };

        Ok(Self { trunk, head })
    }

    /// Computes the action distribution for a batch of observations.
    pub fn forward(&self, xs: &Tensor) -> Result<PolicyOutput> {
        let features = match &self.trunk {
            Trunk::Cnn(cnn) => cnn.forward(xs)?,
            Trunk::Mlp(mlp) => mlp.forward(xs)?,
        };

        let out = match &self.head {
            Head::Logits(logits) => PolicyOutput::Logits(logits.forward(&features)?),
            Head::Gaussian { mean, logstd } => {
                let mean = mean.forward(&features)?;
                let std = logstd.exp()?.broadcast_as(mean.shape())?;
                PolicyOutput::Gaussian { mean, std }
            }
        };
        Ok(out)
    }
}
