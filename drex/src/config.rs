//! Configuration resolved from the command line.
use crate::Args;
use anyhow::Result;
use drex_candle_agent::PolicyAgentConfig;
use drex_core::{env_id, error::DrexError, EnvComposerConfig, EnvType, RolloutConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Agent selected for the evaluation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    /// [`drex_core::RandomAgent`].
    Random,

    /// [`drex_candle_agent::PolicyAgent`]; observations are normalized by the environment.
    Policy,

    /// [`drex_candle_agent::NormalizedPolicyAgent`].
    Normalized,
}

/// Everything needed to run an evaluation.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct EvalConfig {
    /// Logical name of the environment, used to look up the score mask.
    pub env_name: String,

    /// Path of the model parameters, empty for the random agent.
    pub model_path: String,

    /// Agent.
    pub agent: AgentKind,

    /// Shows masked observations at every step.
    pub debug_crop: bool,

    /// Environment chain.
    pub env: EnvComposerConfig,

    /// Policy agents.
    pub policy: PolicyAgentConfig,

    /// Episode loop.
    pub rollout: RolloutConfig,
}

impl EvalConfig {
    /// Validates the arguments and resolves them into a configuration.
    ///
    /// Errors are [`DrexError::Config`].
    pub fn from_args(args: &Args) -> Result<Self> {
        let env_type: EnvType = args.env_type.parse()?;
        let n_episodes: usize = args.episode_count.trim().parse().map_err(|_| {
            DrexError::config(format!(
                "episode_count must be a non-negative integer, got {:?}",
                args.episode_count
            ))
        })?;
        let env_id = env_id(&args.env_name, env_type)?;

        let agent = match (args.random, args.isolated) {
            (true, true) => {
                return Err(DrexError::config("--random and --isolated cannot be combined").into())
            }
            (true, false) => AgentKind::Random,
            (false, true) => AgentKind::Normalized,
            (false, false) => AgentKind::Policy,
        };
        if agent != AgentKind::Random && args.model_path.is_empty() {
            return Err(DrexError::config("--model_path is required unless --random is given").into());
        }
        if args.debug_crop && env_type != EnvType::Atari {
            return Err(DrexError::config("--debug_crop requires an atari environment").into());
        }

        // Statistics are applied by the agent when isolated.
        let stats_path = match agent {
            AgentKind::Normalized => None,
            _ if args.model_path.is_empty() => None,
            _ => Some(PathBuf::from(&args.model_path)),
        };

        let env = EnvComposerConfig::default()
            .env_id(env_id)
            .env_type(env_type)
            .record_video(args.record_video)
            .video_dir(&args.video_dir)
            .render(args.render)
            .seed(args.seed)
            .stats_path(stats_path);
        let policy = PolicyAgentConfig::default()
            .env_type(env_type)
            .stochastic(args.stochastic)
            .use_gpu(!args.cpu)
            .seed(args.seed as u64);
        let rollout = RolloutConfig::default()
            .n_episodes(n_episodes)
            .no_op(args.no_op)
            .render(args.render);

        Ok(Self {
            env_name: args.env_name.clone(),
            model_path: args.model_path.clone(),
            agent,
            debug_crop: args.debug_crop,
            env,
            policy,
            rollout,
        })
    }
}
