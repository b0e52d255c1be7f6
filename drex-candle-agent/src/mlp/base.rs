use super::MlpConfig;
use crate::model::SubModel1;
use anyhow::Result;
use candle_core::{Device, Tensor};
use candle_nn::{linear, Linear, Module, VarBuilder};

/// Returns vector of linear modules from [`MlpConfig`].
fn create_linear_layers(vs: &VarBuilder, config: &MlpConfig) -> Result<Vec<Linear>> {
    let mut dims = vec![config.in_dim];
    dims.extend_from_slice(&config.units);

    dims.windows(2)
        .enumerate()
        .map(|(i, w)| -> Result<Linear> { Ok(linear(w[0], w[1], vs.pp(format!("ln{}", i)))?) })
        .collect()
}

/// Multilayer perceptron used as a feature extractor.
///
/// The activation function is applied after every layer, including the last one.
pub struct Mlp {
    config: MlpConfig,
    device: Device,
    layers: Vec<Linear>,
}

impl SubModel1 for Mlp {
    type Config = MlpConfig;
    type Input = Tensor;
    type Output = Tensor;

    fn forward(&self, xs: &Self::Input) -> Result<Tensor> {
        let mut xs = xs.to_device(&self.device)?;
        for layer in self.layers.iter() {
            xs = self.config.activation.forward(&layer.forward(&xs)?)?;
        }
        Ok(xs)
    }

    fn build(vs: VarBuilder, config: Self::Config) -> Result<Self> {
        let device = vs.device().clone();
        let layers = create_linear_layers(&vs, &config)?;

        Ok(Self {
            config,
            device,
            layers,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mlp::Activation;
    use candle_core::DType;
    use candle_nn::VarMap;

    #[test]
    fn test_tanh_mlp() -> Result<()> {
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &Device::Cpu);
        let mlp = Mlp::build(vb.pp("mlp"), MlpConfig::new(11, vec![64, 64], Activation::Tanh))?;
        assert_eq!(varmap.all_vars().len(), 4);

        let xs = Tensor::randn(0f32, 10f32, (1, 11), &Device::Cpu)?;
        let ys = mlp.forward(&xs)?;
        assert_eq!(ys.dims(), &[1, 64]);
        let ys: Vec<f32> = ys.flatten_all()?.to_vec1()?;
        assert!(ys.iter().all(|y| y.abs() <= 1.0));
        Ok(())
    }
}
