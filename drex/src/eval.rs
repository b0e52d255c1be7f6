//! Agent selection and the evaluation run.
use crate::{AgentKind, DebugCrop, EvalConfig};
use anyhow::Result;
use drex_candle_agent::{NormalizedPolicyAgent, PolicyAgent};
use drex_core::{
    Agent, ClosingEnv, EnvComposer, EnvMaker, EpisodeResult, RandomAgent, Rollout, VecEnv,
};
use log::info;
use std::io::Write;

/// Builds the agent selected in `config` for the wrapped environment `env`.
///
/// Policy agents are built for the observation shape of the outermost wrapper
/// and loaded from `config.model_path`. The random agent samples from the
/// action space of the base environment.
pub fn build_agent(config: &EvalConfig, env: &dyn VecEnv) -> Result<Box<dyn Agent>> {
    let obs_shape = env.observation_shape();

    let agent: Box<dyn Agent> = match config.agent {
        AgentKind::Random => {
            info!("Use RandomAgent");
            let space = env.unwrapped().action_space().clone();
            Box::new(RandomAgent::new(space, config.policy.seed)?)
        }
        AgentKind::Policy => {
            info!("Use PolicyAgent");
            let mut agent =
                PolicyAgent::build(config.policy.clone(), &obs_shape, env.action_space())?;
            agent.load(&config.model_path)?;
            Box::new(agent)
        }
        AgentKind::Normalized => {
            info!("Use NormalizedPolicyAgent");
            let mut agent = NormalizedPolicyAgent::build(
                config.policy.clone(),
                &obs_shape,
                env.action_space(),
                &config.model_path,
            )?;
            agent.load(&config.model_path)?;
            Box::new(agent)
        }
    };

    Ok(agent)
}

/// Runs the evaluation and writes one line per episode to `out`.
///
/// The environment chain is closed on every exit path.
pub fn run<M, W>(config: &EvalConfig, maker: &M, out: &mut W) -> Result<Vec<EpisodeResult>>
where
    M: EnvMaker + ?Sized,
    W: Write + ?Sized,
{
    let composer = EnvComposer::new(config.env.clone());
    let mut env = ClosingEnv::new(composer.build(maker)?);
    let mut agent = build_agent(config, &*env)?;

    let mut rollout = Rollout::new(config.rollout.clone());
    if config.debug_crop {
        let mut crop = DebugCrop::new(&config.env_name);
        rollout = rollout.with_observer(move |obs| crop.inspect(obs));
    }
    let results = rollout.run(&mut *env, agent.as_mut(), out)?;

    env.close()?;
    Ok(results)
}
