//! Configuration of policy agents.
use anyhow::Result;
use drex_core::EnvType;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`PolicyAgent`](super::PolicyAgent) and
/// [`NormalizedPolicyAgent`](super::NormalizedPolicyAgent).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct PolicyAgentConfig {
    /// Selects the network architecture.
    pub env_type: EnvType,

    /// If `true`, actions are sampled from the policy; otherwise the most
    /// probable action or the mean is taken.
    pub stochastic: bool,

    /// If `false`, the inference context is built on the CPU only.
    pub use_gpu: bool,

    /// Seed of the random number generator used for sampling discrete actions.
    pub seed: u64,
}

impl Default for PolicyAgentConfig {
    fn default() -> Self {
        Self {
            env_type: EnvType::Atari,
            stochastic: false,
            use_gpu: true,
            seed: 42,
        }
    }
}

impl PolicyAgentConfig {
    /// Sets the environment type.
    pub fn env_type(mut self, v: EnvType) -> Self {
        self.env_type = v;
        self
    }

    /// Sets stochastic action selection.
    pub fn stochastic(mut self, v: bool) -> Self {
        self.stochastic = v;
        self
    }

    /// Enables or disables the GPU.
    pub fn use_gpu(mut self, v: bool) -> Self {
        self.use_gpu = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Constructs [`PolicyAgentConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`PolicyAgentConfig`] as YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
