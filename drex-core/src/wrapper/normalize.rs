//! Observation normalization with running statistics.
use crate::{
    error::DrexError, Act, EnvStats, NormalizationStats, Obs, RunningMeanStd, Space, Step,
    VecEnv,
};
use anyhow::Result;
use image::RgbImage;
use log::info;
use ndarray::{Axis, IxDyn};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration of [`VecNormalize`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VecNormalizeConfig {
    /// If `true`, the running statistics are frozen.
    pub eval: bool,

    /// Bound of normalized observations.
    pub clip_ob: f32,

    /// Constant added to the variance.
    pub epsilon: f32,
}

impl Default for VecNormalizeConfig {
    fn default() -> Self {
        Self {
            eval: false,
            clip_ob: NormalizationStats::CLIP_BOUND,
            epsilon: NormalizationStats::EPSILON,
        }
    }
}

impl VecNormalizeConfig {
    /// Sets evaluation mode.
    pub fn eval(mut self, v: bool) -> Self {
        self.eval = v;
        self
    }

    /// Sets the clipping bound.
    pub fn clip_ob(mut self, v: f32) -> Self {
        self.clip_ob = v;
        self
    }

    /// Sets epsilon.
    pub fn epsilon(mut self, v: f32) -> Self {
        self.epsilon = v;
        self
    }
}

/// Normalizes observations with running mean and variance.
///
/// In evaluation mode the statistics are only replaced by
/// [`VecEnv::load_stats`], never updated from observations.
pub struct VecNormalize {
    env: Box<dyn VecEnv>,
    config: VecNormalizeConfig,
    ob_rms: RunningMeanStd,
}

impl VecNormalize {
    /// Wraps `env`.
    pub fn new(env: Box<dyn VecEnv>, config: VecNormalizeConfig) -> Self {
        let dim = env.observation_shape().iter().product();
        Self {
            env,
            config,
            ob_rms: RunningMeanStd::new(dim),
        }
    }

    /// Current statistics of observations.
    pub fn ob_rms(&self) -> &RunningMeanStd {
        &self.ob_rms
    }

    fn normalize(&mut self, obs: Obs) -> Result<Obs> {
        let shape = obs.shape().to_vec();
        let flat = obs.0.into_shape((shape[0], self.ob_rms.dim()))?;

        if !self.config.eval {
            let rows: Vec<Vec<f32>> = flat
                .axis_iter(Axis(0))
                .map(|row| row.to_vec())
                .collect();
            self.ob_rms.update(&rows);
        }

        let stats = NormalizationStats::from_running(&self.ob_rms)
            .clip_bound(self.config.clip_ob)
            .epsilon(self.config.epsilon);
        let out = stats.rescale(&flat.into_dyn())?;

        Ok(Obs(out.into_shape(IxDyn(&shape))?))
    }
}

impl VecEnv for VecNormalize {
    fn name(&self) -> &'static str {
        "VecNormalize"
    }

    fn inner(&self) -> Option<&dyn VecEnv> {
        Some(self.env.as_ref())
    }

    fn observation_shape(&self) -> Vec<usize> {
        self.env.observation_shape()
    }

    fn action_space(&self) -> &Space {
        self.env.action_space()
    }

    fn reset(&mut self) -> Result<Obs> {
        let obs = self.env.reset()?;
        self.normalize(obs)
    }

    fn step(&mut self, act: &Act) -> Result<Step> {
        let mut step = self.env.step(act)?;
        let obs = std::mem::replace(&mut step.obs, Obs::dummy(&[0]));
        step.obs = self.normalize(obs)?;
        Ok(step)
    }

    fn render(&mut self) -> Result<()> {
        self.env.render()
    }

    fn render_frame(&mut self) -> Result<Option<RgbImage>> {
        self.env.render_frame()
    }

    fn load_stats(&mut self, model_path: &Path) -> Result<()> {
        let stats = EnvStats::load(model_path)?;
        if stats.ob_rms.dim() != self.ob_rms.dim() {
            return Err(DrexError::load(
                EnvStats::path_for(model_path),
                format!(
                    "statistics of dimension {} for observations of dimension {}",
                    stats.ob_rms.dim(),
                    self.ob_rms.dim()
                ),
            )
            .into());
        }
        info!("Load running statistics from {:?}", EnvStats::path_for(model_path));
        self.ob_rms = stats.ob_rms;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.env.close()
    }
}
