//! Agents selecting actions with a [`PolicyNet`].
mod config;
use crate::{policy::PolicyOutput, Device, PolicyNet};
use anyhow::{Context, Result};
use candle_core::{DType, Tensor};
use candle_nn::{ops::softmax_last_dim, VarBuilder, VarMap};
pub use config::PolicyAgentConfig;
use drex_core::{error::DrexError, Act, Agent, EnvStats, EnvType, NormalizationStats, Obs, Space};
use log::{debug, info};
use rand::{
    distributions::{Distribution, WeightedIndex},
    rngs::SmallRng,
    SeedableRng,
};
use std::path::Path;

/// Device handle, parameters and network of one agent.
///
/// Every agent owns its context; nothing is shared between agents.
struct InferenceContext {
    device: candle_core::Device,
    varmap: VarMap,
    net: PolicyNet,
    loaded: bool,
}

impl InferenceContext {
    fn build(config: &PolicyAgentConfig, obs_shape: &[usize], action_space: &Space) -> Result<Self> {
        let device = Device::from_use_gpu(config.use_gpu).resolve()?;
        info!("Inference context on {:?}", Device::from(&device));
        let varmap = VarMap::new();
        let net = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            PolicyNet::build(vb, config.env_type, obs_shape, action_space)?
        };

        Ok(Self {
            device,
            varmap,
            net,
            loaded: false,
        })
    }

    fn load(&mut self, path: &Path) -> Result<()> {
        if !path.is_file() {
            return Err(DrexError::load(path, "no such file").into());
        }
        self.varmap
            .load(path)
            .map_err(|e| DrexError::load(path, e))?;
        self.loaded = true;
        info!("Load policy from {:?}", path);
        Ok(())
    }

    fn save(&self, path: &Path) -> Result<()> {
        self.varmap.save(path)?;
        info!("Save policy to {:?}", path);
        Ok(())
    }

    fn act(&self, obs: &Obs, stochastic: bool, rng: &mut SmallRng) -> Result<Act> {
        if !self.loaded {
            return Err(DrexError::NotLoaded.into());
        }

        let xs = Tensor::from_vec(obs.iter().copied().collect::<Vec<f32>>(), obs.shape(), &self.device)?;
        let act = match self.net.forward(&xs)? {
            PolicyOutput::Logits(logits) => {
                let a = match stochastic {
                    true => {
                        let probs: Vec<f32> = softmax_last_dim(&logits)?.get(0)?.to_vec1()?;
                        WeightedIndex::new(&probs)?.sample(rng)
                    }
                    false => {
                        let logits: Vec<f32> = logits.get(0)?.to_vec1()?;
                        argmax(&logits).context("Empty logits")?
                    }
                };
                Act::Discrete(a as i64)
            }
            PolicyOutput::Gaussian { mean, std } => {
                let a = match stochastic {
                    true => (&mean + (std * mean.randn_like(0., 1.)?)?)?,
                    false => mean,
                };
                Act::Continuous(a.get(0)?.to_vec1()?)
            }
        };
        debug!("{:?}", act);

        Ok(act)
    }
}

fn argmax(xs: &[f32]) -> Option<usize> {
    xs.iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(i, _)| i)
}

/// Agent selecting actions with a policy network.
///
/// [`PolicyAgent::load`] must be called before the first action; until then
/// [`Agent::act`] fails with [`DrexError::NotLoaded`]. The reward and the done
/// flag given to `act` are ignored.
pub struct PolicyAgent {
    config: PolicyAgentConfig,
    ctx: InferenceContext,
    rng: SmallRng,
}

impl PolicyAgent {
    /// Builds the agent for observations of shape `obs_shape` (without the
    /// batch axis) and actions in `action_space`.
    pub fn build(config: PolicyAgentConfig, obs_shape: &[usize], action_space: &Space) -> Result<Self> {
        let ctx = InferenceContext::build(&config, obs_shape, action_space)?;
        let rng = SmallRng::seed_from_u64(config.seed);

        Ok(Self { config, ctx, rng })
    }

    /// Loads the parameters of the network.
    ///
    /// A missing or unreadable file is a [`DrexError::Load`].
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.ctx.load(path.as_ref())
    }

    /// Saves the parameters of the network as safetensors.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.ctx.save(path.as_ref())
    }

    /// The configuration.
    pub fn config(&self) -> &PolicyAgentConfig {
        &self.config
    }
}

impl Agent for PolicyAgent {
    fn act(&mut self, obs: &Obs, _reward: f32, _done: bool) -> Result<Act> {
        self.ctx.act(obs, self.config.stochastic, &mut self.rng)
    }
}

/// [`PolicyAgent`] rescaling observations before they reach the network.
///
/// For mujoco, the statistics are read from `<model_path>.env_stat.pkl` when
/// the agent is built and applied as
/// `clip((obs - mean) / sqrt(var + 1e-8), -10, 10)`. Atari observations are
/// passed through.
pub struct NormalizedPolicyAgent {
    agent: PolicyAgent,
    stats: Option<NormalizationStats>,
}

impl NormalizedPolicyAgent {
    /// Builds the agent and loads the normalization statistics stored for `model_path`.
    pub fn build(
        config: PolicyAgentConfig,
        obs_shape: &[usize],
        action_space: &Space,
        model_path: impl AsRef<Path>,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        let stats = match config.env_type {
            EnvType::Mujoco => {
                let stats = NormalizationStats::load(model_path)?;
                let dim: usize = obs_shape.iter().product();
                if stats.dim() != dim {
                    return Err(DrexError::load(
                        EnvStats::path_for(model_path),
                        format!(
                            "statistics of dimension {} for observations of dimension {}",
                            stats.dim(),
                            dim
                        ),
                    )
                    .into());
                }
                info!(
                    "Load normalization statistics from {:?}",
                    EnvStats::path_for(model_path)
                );
                Some(stats)
            }
            EnvType::Atari => None,
        };
        let agent = PolicyAgent::build(config, obs_shape, action_space)?;

        Ok(Self { agent, stats })
    }

    /// Loads the parameters of the network.
    pub fn load<T: AsRef<Path>>(&mut self, path: T) -> Result<()> {
        self.agent.load(path)
    }

    /// Saves the parameters of the network.
    pub fn save<T: AsRef<Path>>(&self, path: T) -> Result<()> {
        self.agent.save(path)
    }

    /// Statistics applied to observations, `None` for atari.
    pub fn stats(&self) -> Option<&NormalizationStats> {
        self.stats.as_ref()
    }
}

impl Agent for NormalizedPolicyAgent {
    fn act(&mut self, obs: &Obs, reward: f32, done: bool) -> Result<Act> {
        match &self.stats {
            Some(stats) => {
                let obs = Obs(stats.rescale(obs)?);
                self.agent.act(&obs, reward, done)
            }
            None => self.agent.act(obs, reward, done),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use drex_core::RunningMeanStd;
    use ndarray::{ArrayD, IxDyn};
    use tempdir::TempDir;

    fn mujoco_space() -> Space {
        Space::Box {
            low: vec![-1.0; 3],
            high: vec![1.0; 3],
            shape: vec![3],
        }
    }

    fn mujoco_config() -> PolicyAgentConfig {
        PolicyAgentConfig::default()
            .env_type(EnvType::Mujoco)
            .use_gpu(false)
    }

    fn obs(values: &[f32]) -> Obs {
        Obs(ArrayD::from_shape_vec(IxDyn(&[1, values.len()]), values.to_vec()).unwrap())
    }

    #[test]
    fn test_act_before_load() -> Result<()> {
        let mut agent = PolicyAgent::build(mujoco_config(), &[5], &mujoco_space())?;
        let err = agent.act(&obs(&[0.0; 5]), 0.0, false).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DrexError>(),
            Some(DrexError::NotLoaded)
        ));
        Ok(())
    }

    #[test]
    fn test_load_missing_file() -> Result<()> {
        let mut agent = PolicyAgent::build(mujoco_config(), &[5], &mujoco_space())?;
        let err = agent.load("/nonexistent/model").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DrexError>(),
            Some(DrexError::Load { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_load_reproduces_actions() -> Result<()> {
        let dir = TempDir::new("policy_agent")?;
        let path = dir.path().join("model.safetensors");

        let mut agent1 = PolicyAgent::build(mujoco_config(), &[5], &mujoco_space())?;
        agent1.save(&path)?;
        agent1.load(&path)?;
        let mut agent2 = PolicyAgent::build(mujoco_config(), &[5], &mujoco_space())?;
        agent2.load(&path)?;

        let obs = obs(&[0.1, -0.2, 0.3, 0.4, -0.5]);
        let a1 = agent1.act(&obs, 0.0, false)?;
        assert_eq!(a1, agent2.act(&obs, 1.0, true)?);
        // Deterministic actions do not depend on the call.
        assert_eq!(a1, agent1.act(&obs, 0.0, false)?);
        Ok(())
    }

    #[test]
    fn test_load_wrong_architecture() -> Result<()> {
        let dir = TempDir::new("policy_agent")?;
        let path = dir.path().join("model.safetensors");
        PolicyAgent::build(mujoco_config(), &[5], &mujoco_space())?.save(&path)?;

        let mut agent = PolicyAgent::build(mujoco_config(), &[7], &mujoco_space())?;
        let err = agent.load(&path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<DrexError>(),
            Some(DrexError::Load { .. })
        ));
        Ok(())
    }

    #[test]
    fn test_stochastic_discrete_actions() -> Result<()> {
        let dir = TempDir::new("policy_agent")?;
        let path = dir.path().join("model.safetensors");
        let config = mujoco_config().stochastic(true);
        let space = Space::Discrete { n: 4 };
        let mut agent = PolicyAgent::build(config, &[5], &space)?;
        agent.save(&path)?;
        agent.load(&path)?;

        for _ in 0..20 {
            let act = agent.act(&obs(&[1.0; 5]), 0.0, false)?;
            assert!(space.contains(&act));
        }
        Ok(())
    }

    fn continuous(act: &Act) -> &[f32] {
        match act {
            Act::Continuous(a) => a,
            _ => panic!("expected a continuous action, got {:?}", act),
        }
    }

    #[test]
    fn test_stochastic_continuous_actions() -> Result<()> {
        let dir = TempDir::new("policy_agent")?;
        let path = dir.path().join("model.safetensors");
        let obs = obs(&[0.1, -0.2, 0.3, 0.4, -0.5]);

        let mut agent = PolicyAgent::build(mujoco_config().stochastic(true), &[5], &mujoco_space())?;
        agent.save(&path)?;
        agent.load(&path)?;
        let a1 = agent.act(&obs, 0.0, false)?;
        let a2 = agent.act(&obs, 0.0, false)?;
        assert_eq!(continuous(&a1).len(), 3);
        assert_eq!(continuous(&a2).len(), 3);
        assert_ne!(a1, a2);
        Ok(())
    }

    #[test]
    fn test_stochastic_actions_collapse_to_mean() -> Result<()> {
        let dir = TempDir::new("policy_agent")?;
        let path = dir.path().join("model.safetensors");
        let obs = obs(&[0.1, -0.2, 0.3, 0.4, -0.5]);

        let mut source = PolicyAgent::build(mujoco_config(), &[5], &mujoco_space())?;
        let logstd = Tensor::full(-30f32, (1, 3), &candle_core::Device::Cpu)?;
        source.ctx.varmap.set_one("pi.logstd", logstd)?;
        source.save(&path)?;

        let mut deterministic = PolicyAgent::build(mujoco_config(), &[5], &mujoco_space())?;
        deterministic.load(&path)?;
        let mut stochastic =
            PolicyAgent::build(mujoco_config().stochastic(true), &[5], &mujoco_space())?;
        stochastic.load(&path)?;

        let mean = deterministic.act(&obs, 0.0, false)?;
        for _ in 0..5 {
            let act = stochastic.act(&obs, 0.0, false)?;
            for (x, m) in continuous(&act).iter().zip(continuous(&mean).iter()) {
                assert!((x - m).abs() < 1e-6, "{} vs {}", x, m);
            }
        }
        Ok(())
    }

    #[test]
    fn test_missing_normalization_stats() {
        let dir = TempDir::new("policy_agent").unwrap();
        let model_path = dir.path().join("model");
        let err = NormalizedPolicyAgent::build(mujoco_config(), &[5], &mujoco_space(), &model_path)
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<DrexError>(),
            Some(DrexError::Load { .. })
        ));
    }

    #[test]
    fn test_normalized_agent_rescales() -> Result<()> {
        let dir = TempDir::new("policy_agent")?;
        let model_path = dir.path().join("model");
        let mean = [1.0, 2.0, 3.0, 4.0, 5.0];
        EnvStats {
            ob_rms: RunningMeanStd {
                mean: mean.iter().map(|&x| x as f64).collect(),
                var: vec![1.0; 5],
                count: 10.0,
            },
            ret_rms: None,
        }
        .save(&model_path)?;

        let mut plain = PolicyAgent::build(mujoco_config(), &[5], &mujoco_space())?;
        plain.save(&model_path)?;
        plain.load(&model_path)?;
        let mut normalized =
            NormalizedPolicyAgent::build(mujoco_config(), &[5], &mujoco_space(), &model_path)?;
        normalized.load(&model_path)?;
        assert!(normalized.stats().is_some());

        // An observation at the mean is rescaled to zero.
        assert_eq!(
            normalized.act(&obs(&mean), 0.0, false)?,
            plain.act(&obs(&[0.0; 5]), 0.0, false)?
        );
        Ok(())
    }

    #[test]
    fn test_normalized_atari_passthrough() -> Result<()> {
        let config = PolicyAgentConfig::default().use_gpu(false);
        let agent = NormalizedPolicyAgent::build(
            config,
            &[4, 84, 84],
            &Space::Discrete { n: 6 },
            "/nonexistent/model",
        )?;
        assert!(agent.stats().is_none());
        Ok(())
    }
}
