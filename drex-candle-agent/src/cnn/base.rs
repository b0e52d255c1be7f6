use super::CnnConfig;
use crate::model::SubModel1;
use anyhow::Result;
use candle_core::{DType::F32, Device, Tensor};
use candle_nn::{
    conv::Conv2dConfig,
    conv2d, linear,
    sequential::{seq, Sequential},
    Module, VarBuilder,
};

#[allow(clippy::upper_case_acronyms)]
/// Convolutional neural network, which has the same architecture of the DQN paper.
///
/// Inputs are `[batch, n_stack, height, width]` with pixel values in `[0, 255]`.
/// The output is a feature vector of `out_dim` elements after ReLU.
pub struct Cnn {
    device: Device,
    seq: Sequential,
}

impl Cnn {
    fn stride(s: usize) -> Conv2dConfig {
        Conv2dConfig {
            stride: s,
            ..Default::default()
        }
    }

    fn create_net(vb: &VarBuilder, config: &CnnConfig) -> Result<Sequential> {
        let seq = seq()
            .add_fn(|xs| xs.to_dtype(F32)?.affine(1.0 / 255.0, 0.0))
            .add(conv2d(config.n_stack, 32, 8, Self::stride(4), vb.pp("c1"))?)
            .add_fn(|xs| xs.relu())
            .add(conv2d(32, 64, 4, Self::stride(2), vb.pp("c2"))?)
            .add_fn(|xs| xs.relu())
            .add(conv2d(64, 64, 3, Self::stride(1), vb.pp("c3"))?)
            .add_fn(|xs| xs.relu()?.flatten_from(1))
            .add(linear(config.flatten_dim(), config.out_dim, vb.pp("l1"))?)
            .add_fn(|xs| xs.relu());

        Ok(seq)
    }
}

impl SubModel1 for Cnn {
    type Config = CnnConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn forward(&self, x: &Self::Input) -> Result<Tensor> {
        Ok(self.seq.forward(&x.to_device(&self.device)?)?)
    }

    fn build(vb: VarBuilder, config: Self::Config) -> Result<Self> {
        let device = vb.device().clone();
        let seq = Self::create_net(&vb, &config)?;

        Ok(Self { device, seq })
    }
}
