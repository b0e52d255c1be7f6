//! Environment.
use super::{Act, Obs, Space, Step};
use crate::{error::DrexError, EnvComposerConfig};
use anyhow::Result;
use image::RgbImage;
use std::path::Path;

/// A vectorized environment with a single batched instance.
///
/// Wrappers implement this trait as well and expose the environment they wrap
/// through [`VecEnv::inner`], so that the wrapper chain can be inspected and the
/// base environment reached with [`unwrapped`](#method.unwrapped).
pub trait VecEnv {
    /// Name of the environment or wrapper.
    fn name(&self) -> &'static str;

    /// The wrapped environment, `None` for a base environment.
    fn inner(&self) -> Option<&dyn VecEnv> {
        None
    }

    /// Shape of a single observation, without the batch axis.
    fn observation_shape(&self) -> Vec<usize>;

    /// Action space of the environment.
    fn action_space(&self) -> &Space;

    /// Resets the environment and returns the initial observation.
    fn reset(&mut self) -> Result<Obs>;

    /// Performs an environment step.
    fn step(&mut self, act: &Act) -> Result<Step>;

    /// Renders the current state on screen.
    fn render(&mut self) -> Result<()>;

    /// Returns the current frame as an RGB image if the environment can produce one.
    fn render_frame(&mut self) -> Result<Option<RgbImage>>;

    /// Loads persisted running statistics derived from `model_path`.
    ///
    /// Environments that keep no such statistics return
    /// [`DrexError::StatsUnsupported`]. Wrappers forward the call to the
    /// environment they wrap.
    fn load_stats(&mut self, _model_path: &Path) -> Result<()> {
        Err(DrexError::StatsUnsupported.into())
    }

    /// Releases the resources of the environment, including wrapped ones.
    fn close(&mut self) -> Result<()>;
}

impl dyn VecEnv + '_ {
    /// Returns the base environment at the bottom of the wrapper chain.
    pub fn unwrapped(&self) -> &dyn VecEnv {
        let mut env: &dyn VecEnv = self;
        while let Some(inner) = env.inner() {
            env = inner;
        }
        env
    }

    /// Returns the names in the wrapper chain, outermost first.
    pub fn wrapper_chain(&self) -> Vec<&'static str> {
        let mut names = vec![self.name()];
        let mut env: &dyn VecEnv = self;
        while let Some(inner) = env.inner() {
            names.push(inner.name());
            env = inner;
        }
        names
    }
}

/// Creates base environments for [`EnvComposer`](crate::EnvComposer).
///
/// The base environment must have reward clipping and episode-life semantics
/// disabled, so that full-game episodes are evaluated.
pub trait EnvMaker {
    /// Builds the base environment described by `config`.
    fn make(&self, config: &EnvComposerConfig) -> Result<Box<dyn VecEnv>>;
}

impl<F> EnvMaker for F
where
    F: Fn(&EnvComposerConfig) -> Result<Box<dyn VecEnv>>,
{
    fn make(&self, config: &EnvComposerConfig) -> Result<Box<dyn VecEnv>> {
        self(config)
    }
}
