//! A scripted environment used for tests.
use crate::{Act, Obs, Space, Step, VecEnv};
use anyhow::{bail, Result};
use image::{Rgb, RgbImage};
use std::{cell::RefCell, rc::Rc};

/// Interactions observed by a [`ScriptedEnv`].
#[derive(Clone, Debug, Default)]
pub struct ScriptLog {
    /// Actions in the order they were applied.
    pub actions: Vec<Act>,

    /// Number of resets.
    pub resets: usize,

    /// Number of calls to `render()`.
    pub renders: usize,

    /// Number of calls to `close()`.
    pub closed: usize,
}

/// Environment emitting a fixed sequence of rewards.
///
/// An episode lasts `rewards.len()` steps; step `t` (starting at 1) yields
/// `rewards[t - 1]`. Every element of the observation after `t` steps is
/// `t + 1`, so the reset observation is filled with ones.
pub struct ScriptedEnv {
    rewards: Vec<f32>,
    obs_shape: Vec<usize>,
    action_space: Space,
    frames: bool,
    fail_at: Option<usize>,
    t: usize,
    log: Rc<RefCell<ScriptLog>>,
}

impl ScriptedEnv {
    /// Vector observations of dimension 4 and 6 discrete actions.
    pub fn new(rewards: Vec<f32>) -> Self {
        Self {
            rewards,
            obs_shape: vec![4],
            action_space: Space::Discrete { n: 6 },
            frames: false,
            fail_at: None,
            t: 0,
            log: Rc::new(RefCell::new(ScriptLog::default())),
        }
    }

    /// Sets the shape of observations, without the batch axis.
    pub fn obs_shape(mut self, v: Vec<usize>) -> Self {
        self.obs_shape = v;
        self
    }

    /// Sets the action space.
    pub fn action_space(mut self, v: Space) -> Self {
        self.action_space = v;
        self
    }

    /// Makes `render_frame()` return small images.
    pub fn with_frames(mut self) -> Self {
        self.frames = true;
        self
    }

    /// Makes the `t`-th step of an episode fail.
    pub fn fail_at(mut self, t: usize) -> Self {
        self.fail_at = Some(t);
        self
    }

    /// Records interactions into `log`.
    pub fn log_to(mut self, log: Rc<RefCell<ScriptLog>>) -> Self {
        self.log = log;
        self
    }

    /// Handle to the interaction log.
    pub fn log(&self) -> Rc<RefCell<ScriptLog>> {
        self.log.clone()
    }

    fn obs(&self) -> Obs {
        let mut shape = vec![1];
        shape.extend_from_slice(&self.obs_shape);
        let mut obs = Obs::dummy(&shape);
        obs.fill((self.t + 1) as f32);
        obs
    }
}

impl VecEnv for ScriptedEnv {
    fn name(&self) -> &'static str {
        "ScriptedEnv"
    }

    fn observation_shape(&self) -> Vec<usize> {
        self.obs_shape.clone()
    }

    fn action_space(&self) -> &Space {
        &self.action_space
    }

    fn reset(&mut self) -> Result<Obs> {
        self.t = 0;
        self.log.borrow_mut().resets += 1;
        Ok(self.obs())
    }

    fn step(&mut self, act: &Act) -> Result<Step> {
        if self.fail_at == Some(self.t + 1) {
            bail!("Scripted failure at step {}", self.t + 1);
        }
        self.log.borrow_mut().actions.push(act.clone());

        let reward = self.rewards.get(self.t).copied().unwrap_or(0.0);
        self.t += 1;
        let is_terminated = (self.t >= self.rewards.len()) as i8;

        Ok(Step::new(
            self.obs(),
            act.clone(),
            vec![reward],
            vec![is_terminated],
            vec![0],
        ))
    }

    fn render(&mut self) -> Result<()> {
        self.log.borrow_mut().renders += 1;
        Ok(())
    }

    fn render_frame(&mut self) -> Result<Option<RgbImage>> {
        if !self.frames {
            return Ok(None);
        }
        Ok(Some(RgbImage::from_pixel(4, 4, Rgb([self.t as u8, 0, 0]))))
    }

    fn close(&mut self) -> Result<()> {
        self.log.borrow_mut().closed += 1;
        Ok(())
    }
}
