//! Environment step.
use super::{Act, Obs};

/// Represents an action, observation and reward tuple `(a_t, o_t+1, r_t)`.
///
/// A [`VecEnv`](super::VecEnv) emits a [`Step`] object at every interaction step.
/// The vectors hold one element per batched environment.
#[derive(Clone, Debug)]
pub struct Step {
    /// Action.
    pub act: Act,

    /// Observation.
    pub obs: Obs,

    /// Reward.
    pub reward: Vec<f32>,

    /// Flag denoting if episode is terminated.
    pub is_terminated: Vec<i8>,

    /// Flag denoting if episode is truncated.
    pub is_truncated: Vec<i8>,
}

impl Step {
    /// Constructs a [`Step`] object.
    pub fn new(
        obs: Obs,
        act: Act,
        reward: Vec<f32>,
        is_terminated: Vec<i8>,
        is_truncated: Vec<i8>,
    ) -> Self {
        Step {
            act,
            obs,
            reward,
            is_terminated,
            is_truncated,
        }
    }

    #[inline]
    /// Terminated or truncated.
    pub fn is_done(&self) -> bool {
        self.is_terminated[0] == 1 || self.is_truncated[0] == 1
    }
}
