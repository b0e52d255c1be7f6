//! Configuration of the episode loop.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Rollout`](super::Rollout).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RolloutConfig {
    /// Number of episodes.
    pub n_episodes: usize,

    /// Issues the no-op action of the action space instead of asking the agent.
    pub no_op: bool,

    /// Renders the environment after every step.
    pub render: bool,
}

impl Default for RolloutConfig {
    fn default() -> Self {
        Self {
            n_episodes: 100,
            no_op: false,
            render: false,
        }
    }
}

impl RolloutConfig {
    /// Sets the number of episodes.
    pub fn n_episodes(mut self, v: usize) -> Self {
        self.n_episodes = v;
        self
    }

    /// Sets no-op mode.
    pub fn no_op(mut self, v: bool) -> Self {
        self.no_op = v;
        self
    }

    /// Sets render mode.
    pub fn render(mut self, v: bool) -> Self {
        self.render = v;
        self
    }

    /// Loads [`RolloutConfig`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`RolloutConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
