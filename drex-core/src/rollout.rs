//! Episode loop.
mod config;
mod guard;
use crate::{Agent, Obs, VecEnv};
use anyhow::Result;
pub use config::RolloutConfig;
pub use guard::ClosingEnv;
use log::{debug, info};
use std::io::Write;

/// Length and return of a finished episode.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct EpisodeResult {
    /// Number of steps.
    pub step_count: usize,

    /// Sum of rewards.
    pub accumulated_reward: f32,
}

/// Runs an agent on an environment for a number of episodes.
///
/// Each finished episode is written as `"<step_count> <accumulated_reward>"`
/// on its own line. An observer can be installed to inspect every observation
/// returned by the environment; it cannot change what the agent sees.
pub struct Rollout<'a> {
    config: RolloutConfig,
    observer: Option<Box<dyn FnMut(&Obs) -> Result<()> + 'a>>,
}

impl<'a> Rollout<'a> {
    /// Constructs a rollout.
    pub fn new(config: RolloutConfig) -> Self {
        Self {
            config,
            observer: None,
        }
    }

    /// Installs a step observer.
    pub fn with_observer(mut self, observer: impl FnMut(&Obs) -> Result<()> + 'a) -> Self {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Runs the episodes and returns their results.
    ///
    /// The environment is not closed; see [`ClosingEnv`].
    pub fn run<W: Write + ?Sized>(
        &mut self,
        env: &mut dyn VecEnv,
        agent: &mut dyn Agent,
        out: &mut W,
    ) -> Result<Vec<EpisodeResult>> {
        let mut results = Vec::with_capacity(self.config.n_episodes);

        for ix in 0..self.config.n_episodes {
            let mut obs = env.reset()?;
            let mut episode = EpisodeResult::default();
            let mut reward = 0f32;
            let mut done = false;

            while !done {
                let act = if self.config.no_op {
                    env.action_space().no_op()
                } else {
                    agent.act(&obs, reward, done)?
                };
                let step = env.step(&act)?;

                if let Some(observer) = self.observer.as_mut() {
                    observer(&step.obs)?;
                }
                if self.config.render {
                    env.render()?;
                }

                episode.step_count += 1;
                episode.accumulated_reward += step.reward[0];
                reward = step.reward[0];
                done = step.is_done();
                obs = step.obs;
            }

            writeln!(out, "{} {}", episode.step_count, episode.accumulated_reward)?;
            info!(
                "Episode {}: {} steps, return {}",
                ix, episode.step_count, episode.accumulated_reward
            );
            results.push(episode);
        }

        if !results.is_empty() {
            let mean = results.iter().map(|r| r.accumulated_reward).sum::<f32>()
                / results.len() as f32;
            info!("Mean return over {} episodes: {}", results.len(), mean);
        } else {
            debug!("No episodes were run");
        }

        Ok(results)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{dummy::ScriptedEnv, Act, Space};

    /// Records what it is given and always returns action 1.
    struct RecordingAgent {
        calls: Vec<(f32, bool, f32)>,
    }

    impl Agent for RecordingAgent {
        fn act(&mut self, obs: &Obs, reward: f32, done: bool) -> Result<Act> {
            self.calls.push((reward, done, obs[[0, 0]]));
            Ok(Act::Discrete(1))
        }
    }

    #[test]
    fn test_episode_output() -> Result<()> {
        let mut env = ScriptedEnv::new(vec![1.0, 2.0, 3.0]);
        let mut agent = RecordingAgent { calls: vec![] };
        let mut out = Vec::new();
        let config = RolloutConfig::default().n_episodes(2);

        let results = Rollout::new(config).run(&mut env, &mut agent, &mut out)?;

        assert_eq!(String::from_utf8(out)?, "3 6\n3 6\n");
        assert_eq!(
            results,
            vec![
                EpisodeResult {
                    step_count: 3,
                    accumulated_reward: 6.0
                };
                2
            ]
        );
        Ok(())
    }

    #[test]
    fn test_agent_inputs() -> Result<()> {
        let mut env = ScriptedEnv::new(vec![1.0, 2.0, 3.0]);
        let mut agent = RecordingAgent { calls: vec![] };
        let config = RolloutConfig::default().n_episodes(2);
        Rollout::new(config).run(&mut env, &mut agent, &mut std::io::sink())?;

        let episode = vec![(0.0, false, 1.0), (1.0, false, 2.0), (2.0, false, 3.0)];
        assert_eq!(agent.calls[..3], episode[..]);
        // Reward and done start over at every reset.
        assert_eq!(agent.calls[3..], episode[..]);
        Ok(())
    }

    #[test]
    fn test_no_op() -> Result<()> {
        let space = Space::Box {
            low: vec![-1.0; 2],
            high: vec![1.0; 2],
            shape: vec![2],
        };
        let mut env = ScriptedEnv::new(vec![0.5; 4]).action_space(space);
        let log = env.log();
        let mut agent = RecordingAgent { calls: vec![] };
        let config = RolloutConfig::default().n_episodes(1).no_op(true);
        Rollout::new(config).run(&mut env, &mut agent, &mut std::io::sink())?;

        assert!(agent.calls.is_empty());
        assert_eq!(log.borrow().actions, vec![Act::Continuous(vec![0.0; 2]); 4]);
        Ok(())
    }

    #[test]
    fn test_observer_and_render() -> Result<()> {
        let mut env = ScriptedEnv::new(vec![1.0; 5]);
        let log = env.log();
        let mut agent = RecordingAgent { calls: vec![] };
        let mut observed = 0;
        let config = RolloutConfig::default().n_episodes(1).render(true);
        Rollout::new(config)
            .with_observer(|_| {
                observed += 1;
                Ok(())
            })
            .run(&mut env, &mut agent, &mut std::io::sink())?;

        assert_eq!(observed, 5);
        assert_eq!(log.borrow().renders, 5);
        Ok(())
    }

    #[test]
    fn test_step_failure_propagates() {
        let mut env = ScriptedEnv::new(vec![1.0; 5]).fail_at(2);
        let mut agent = RecordingAgent { calls: vec![] };
        let config = RolloutConfig::default().n_episodes(1);
        let result = Rollout::new(config).run(&mut env, &mut agent, &mut std::io::sink());
        assert!(result.is_err());
    }
}
