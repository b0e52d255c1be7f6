//! Agent.
use super::{Act, Obs};
use anyhow::Result;

/// Selects actions on an environment.
///
/// This is the only capability the rollout loop relies on. Random agents,
/// policy agents and policy agents with observation normalization all expose
/// it, and the variant in use is chosen once, at construction.
///
/// Implementations must not modify the observation or the reward they are given.
pub trait Agent {
    /// Returns an action given the latest observation, the reward of the previous
    /// step and whether the previous step ended an episode.
    fn act(&mut self, obs: &Obs, reward: f32, done: bool) -> Result<Act>;
}

impl<A: Agent + ?Sized> Agent for Box<A> {
    fn act(&mut self, obs: &Obs, reward: f32, done: bool) -> Result<Act> {
        (**self).act(obs, reward, done)
    }
}
