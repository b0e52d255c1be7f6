//! Policy agents implemented with [candle](https://crates.io/crates/candle-core).
//!
//! [`PolicyAgent`] selects actions with a network whose architecture is chosen
//! by the environment type: a convolutional trunk for atari and a multilayer
//! perceptron for mujoco. [`NormalizedPolicyAgent`] additionally rescales
//! observations with persisted running statistics.
pub mod cnn;
pub mod mlp;
pub mod model;
mod agent;
mod policy;
use anyhow::Result;
use candle_core::DeviceLocation;
use serde::{Deserialize, Serialize};
pub use agent::{NormalizedPolicyAgent, PolicyAgent, PolicyAgentConfig};
pub use policy::{PolicyNet, PolicyOutput};

#[derive(Clone, Debug, Copy, Deserialize, Serialize, PartialEq)]
/// Device for using candle.
///
/// This enum is added because [`candle_core::Device`] does not support serialization.
pub enum Device {
    /// The main CPU device.
    Cpu,

    /// The main GPU device.
    Cuda(usize),
}

impl Device {
    /// The first GPU if `use_gpu`, the CPU otherwise.
    pub fn from_use_gpu(use_gpu: bool) -> Self {
        match use_gpu {
            true => Self::Cuda(0),
            false => Self::Cpu,
        }
    }

    /// Creates the candle device.
    ///
    /// A GPU device falls back to the CPU when CUDA is not available.
    pub fn resolve(self) -> Result<candle_core::Device> {
        match self {
            Self::Cpu => Ok(candle_core::Device::Cpu),
            Self::Cuda(n) => Ok(candle_core::Device::cuda_if_available(n)?),
        }
    }
}

impl From<&candle_core::Device> for Device {
    fn from(device: &candle_core::Device) -> Self {
        match device.location() {
            DeviceLocation::Cuda { gpu_id } => Self::Cuda(gpu_id),
            _ => Self::Cpu,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_cpu_only() -> Result<()> {
        let device = Device::from_use_gpu(false).resolve()?;
        assert_eq!(Device::from(&device), Device::Cpu);
        Ok(())
    }
}
