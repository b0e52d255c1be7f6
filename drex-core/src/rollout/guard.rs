//! Scoped ownership of an environment.
use crate::VecEnv;
use anyhow::Result;
use log::warn;
use std::ops::{Deref, DerefMut};

/// Owns an environment chain and closes it when dropped.
///
/// [`ClosingEnv::close`] closes explicitly and reports the error. If the guard
/// is dropped without it, for instance while an error propagates, the chain
/// is closed and a failure is only logged.
pub struct ClosingEnv {
    env: Box<dyn VecEnv>,
    closed: bool,
}

impl ClosingEnv {
    /// Takes ownership of `env`.
    pub fn new(env: Box<dyn VecEnv>) -> Self {
        Self { env, closed: false }
    }

    /// Closes the environment chain.
    pub fn close(mut self) -> Result<()> {
        self.closed = true;
        self.env.close()
    }
}

impl Deref for ClosingEnv {
    type Target = dyn VecEnv;

    fn deref(&self) -> &Self::Target {
        self.env.as_ref()
    }
}

impl DerefMut for ClosingEnv {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.env.as_mut()
    }
}

impl Drop for ClosingEnv {
    fn drop(&mut self) {
        if !self.closed {
            if let Err(e) = self.env.close() {
                warn!("Failed to close {}: {}", self.env.name(), e);
            }
        }
    }
}
