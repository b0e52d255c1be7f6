//! Core functionalities.
mod agent;
mod env;
mod space;
mod step;
pub use agent::Agent;
pub use env::{EnvMaker, VecEnv};
use ndarray::ArrayD;
pub use space::Space;
use std::ops::{Deref, DerefMut};
pub use step::Step;

/// Observation of a vectorized environment.
///
/// The first axis is the batch axis. Since only a single environment is batched,
/// its length is always 1.
#[derive(Clone, Debug, PartialEq)]
pub struct Obs(pub ArrayD<f32>);

impl Obs {
    /// Returns an observation filled with zeros.
    pub fn dummy(shape: &[usize]) -> Self {
        Self(ArrayD::zeros(shape))
    }

    /// Returns the number of environments in the batch.
    pub fn len(&self) -> usize {
        self.0.shape().first().copied().unwrap_or(0)
    }

    /// Returns `true` if the batch is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<ArrayD<f32>> for Obs {
    fn from(array: ArrayD<f32>) -> Self {
        Self(array)
    }
}

impl Deref for Obs {
    type Target = ArrayD<f32>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl DerefMut for Obs {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// Action applied to a vectorized environment.
#[derive(Clone, Debug, PartialEq)]
pub enum Act {
    /// Index of a discrete action.
    Discrete(i64),

    /// Continuous action vector.
    Continuous(Vec<f32>),
}
