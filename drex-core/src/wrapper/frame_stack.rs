//! Stacking of consecutive frames.
use crate::{error::DrexError, Act, Obs, Space, Step, VecEnv};
use anyhow::{bail, Context, Result};
use image::RgbImage;
use log::trace;
use ndarray::{s, Array4, Axis, Ix4};
use std::path::Path;

/// Stacks the last `n_stack` frames along the channel axis.
///
/// Observations of the wrapped environment are `[batch, height, width]` or
/// `[batch, channel, height, width]`. The stacked observation is
/// `[batch, n_stack * channel, height, width]` with the newest frame last.
/// The stack is zeroed at reset and when an episode ends.
pub struct VecFrameStack {
    env: Box<dyn VecEnv>,
    n_stack: usize,
    stacked: Option<Array4<f32>>,
}

impl VecFrameStack {
    /// Wraps `env`.
    ///
    /// `n_stack` must be positive.
    pub fn new(env: Box<dyn VecEnv>, n_stack: usize) -> Result<Self> {
        if n_stack == 0 {
            return Err(DrexError::config("the number of stacked frames must be positive").into());
        }
        Ok(Self {
            env,
            n_stack,
            stacked: None,
        })
    }

    /// Number of stacked frames.
    pub fn n_stack(&self) -> usize {
        self.n_stack
    }

    fn as_frames(obs: Obs) -> Result<Array4<f32>> {
        let obs = match obs.0.ndim() {
            3 => obs.0.insert_axis(Axis(1)),
            4 => obs.0,
            n => bail!("VecFrameStack expects image observations, got {} axes", n),
        };
        Ok(obs.into_dimensionality::<Ix4>()?)
    }
}

impl VecEnv for VecFrameStack {
    fn name(&self) -> &'static str {
        "VecFrameStack"
    }

    fn inner(&self) -> Option<&dyn VecEnv> {
        Some(self.env.as_ref())
    }

    fn observation_shape(&self) -> Vec<usize> {
        let mut shape = self.env.observation_shape();
        match shape.len() {
            2 => shape.insert(0, self.n_stack),
            _ => {
                if let Some(c) = shape.first_mut() {
                    *c *= self.n_stack;
                }
            }
        }
        shape
    }

    fn action_space(&self) -> &Space {
        self.env.action_space()
    }

    fn reset(&mut self) -> Result<Obs> {
        let frames = Self::as_frames(self.env.reset()?)?;
        let (b, c, h, w) = frames.dim();
        let mut stacked = Array4::zeros((b, c * self.n_stack, h, w));
        stacked
            .slice_mut(s![.., c * (self.n_stack - 1).., .., ..])
            .assign(&frames);
        self.stacked = Some(stacked.clone());

        Ok(Obs(stacked.into_dyn()))
    }

    fn step(&mut self, act: &Act) -> Result<Step> {
        trace!("VecFrameStack::step()");
        let step = self.env.step(act)?;
        let is_done = step.is_done();
        let Step {
            act,
            obs,
            reward,
            is_terminated,
            is_truncated,
        } = step;

        let frames = Self::as_frames(obs)?;
        let stacked = self
            .stacked
            .as_mut()
            .context("VecFrameStack::step() was called before reset()")?;
        let c = frames.shape()[1];
        if c * self.n_stack != stacked.shape()[1] || frames.shape()[2..] != stacked.shape()[2..] {
            bail!(
                "Frame of shape {:?} does not fit the stack of shape {:?}",
                frames.shape(),
                stacked.shape()
            );
        }

        let keep = c * (self.n_stack - 1);
        if is_done {
            stacked.fill(0.0);
        } else {
            let older = stacked.slice(s![.., c.., .., ..]).to_owned();
            stacked.slice_mut(s![.., ..keep, .., ..]).assign(&older);
        }
        stacked.slice_mut(s![.., keep.., .., ..]).assign(&frames);
        let obs = Obs(stacked.clone().into_dyn());

        Ok(Step::new(obs, act, reward, is_terminated, is_truncated))
    }

    fn render(&mut self) -> Result<()> {
        self.env.render()
    }

    fn render_frame(&mut self) -> Result<Option<RgbImage>> {
        self.env.render_frame()
    }

    fn load_stats(&mut self, model_path: &Path) -> Result<()> {
        self.env.load_stats(model_path)
    }

    fn close(&mut self) -> Result<()> {
        self.env.close()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dummy::ScriptedEnv;

    fn channel_values(obs: &Obs) -> Vec<f32> {
        // Each scripted frame is constant, so one pixel identifies it.
        obs.0
            .index_axis(Axis(0), 0)
            .outer_iter()
            .map(|frame| frame.iter().next().copied().unwrap())
            .collect()
    }

    #[test]
    fn test_stack_order() -> Result<()> {
        let env = ScriptedEnv::new(vec![0.0; 10]).obs_shape(vec![3, 2]);
        let mut env = VecFrameStack::new(Box::new(env), 4)?;
        assert_eq!(env.observation_shape(), vec![4, 3, 2]);

        let obs = env.reset()?;
        assert_eq!(obs.shape(), &[1, 4, 3, 2]);
        assert_eq!(channel_values(&obs), vec![0.0, 0.0, 0.0, 1.0]);

        let step = env.step(&Act::Discrete(0))?;
        assert_eq!(channel_values(&step.obs), vec![0.0, 0.0, 1.0, 2.0]);

        for _ in 0..3 {
            env.step(&Act::Discrete(0))?;
        }
        let step = env.step(&Act::Discrete(0))?;
        assert_eq!(channel_values(&step.obs), vec![3.0, 4.0, 5.0, 6.0]);
        Ok(())
    }

    #[test]
    fn test_reset_clears_stack() -> Result<()> {
        let env = ScriptedEnv::new(vec![0.0; 3]).obs_shape(vec![2, 2]);
        let mut env = VecFrameStack::new(Box::new(env), 4)?;
        env.reset()?;
        env.step(&Act::Discrete(0))?;
        env.step(&Act::Discrete(0))?;

        let obs = env.reset()?;
        assert_eq!(channel_values(&obs), vec![0.0, 0.0, 0.0, 1.0]);
        Ok(())
    }

    #[test]
    fn test_channel_images() -> Result<()> {
        let env = ScriptedEnv::new(vec![0.0; 3]).obs_shape(vec![3, 2, 2]);
        let mut env = VecFrameStack::new(Box::new(env), 4)?;
        assert_eq!(env.observation_shape(), vec![12, 2, 2]);
        let obs = env.reset()?;
        assert_eq!(obs.shape(), &[1, 12, 2, 2]);
        Ok(())
    }

    #[test]
    fn test_episode_end_clears_stack() -> Result<()> {
        let env = ScriptedEnv::new(vec![0.0; 2]).obs_shape(vec![2, 2]);
        let mut env = VecFrameStack::new(Box::new(env), 4)?;
        env.reset()?;

        let step = env.step(&Act::Discrete(0))?;
        assert!(!step.is_done());
        assert_eq!(channel_values(&step.obs), vec![0.0, 0.0, 1.0, 2.0]);

        let step = env.step(&Act::Discrete(0))?;
        assert!(step.is_done());
        assert_eq!(channel_values(&step.obs), vec![0.0, 0.0, 0.0, 3.0]);
        Ok(())
    }

    #[test]
    fn test_zero_stack_rejected() {
        let env = ScriptedEnv::new(vec![0.0; 3]).obs_shape(vec![2, 2]);
        let err = VecFrameStack::new(Box::new(env), 0).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<DrexError>(),
            Some(DrexError::Config(_))
        ));
    }

    #[test]
    fn test_step_before_reset() -> Result<()> {
        let env = ScriptedEnv::new(vec![0.0; 3]).obs_shape(vec![2, 2]);
        let mut env = VecFrameStack::new(Box::new(env), 4)?;
        assert!(env.step(&Act::Discrete(0)).is_err());
        Ok(())
    }

    #[test]
    fn test_vector_observations_rejected() -> Result<()> {
        let env = ScriptedEnv::new(vec![0.0; 3]).obs_shape(vec![5]);
        let mut env = VecFrameStack::new(Box::new(env), 4)?;
        assert!(env.reset().is_err());
        Ok(())
    }
}
