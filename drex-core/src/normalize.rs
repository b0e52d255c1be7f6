//! Running statistics and observation rescaling.
use crate::error::DrexError;
use anyhow::{Context, Result};
use ndarray::{ArrayD, Axis};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::{Path, PathBuf},
};

/// Running mean and variance of a vector-valued quantity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunningMeanStd {
    /// Mean per dimension.
    pub mean: Vec<f64>,

    /// Variance per dimension.
    pub var: Vec<f64>,

    /// Number of samples seen, starting from a small positive value.
    pub count: f64,
}

impl RunningMeanStd {
    /// Zero mean, unit variance.
    pub fn new(dim: usize) -> Self {
        Self {
            mean: vec![0.0; dim],
            var: vec![1.0; dim],
            count: 1e-4,
        }
    }

    /// Dimensionality of the statistics.
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Merges the moments of a batch of samples, each row being one sample.
    pub fn update(&mut self, batch: &[Vec<f32>]) {
        if batch.is_empty() {
            return;
        }
        let batch_count = batch.len() as f64;

        for i in 0..self.dim() {
            let batch_mean = batch.iter().map(|x| x[i] as f64).sum::<f64>() / batch_count;
            let batch_var = batch
                .iter()
                .map(|x| (x[i] as f64 - batch_mean).powi(2))
                .sum::<f64>()
                / batch_count;

            let delta = batch_mean - self.mean[i];
            let total = self.count + batch_count;
            let m2 = self.var[i] * self.count
                + batch_var * batch_count
                + delta * delta * self.count * batch_count / total;

            self.mean[i] += delta * batch_count / total;
            self.var[i] = m2 / total;
        }
        self.count += batch_count;
    }
}

/// Running statistics of an environment persisted next to model parameters.
///
/// The file lives at `<model_path>.env_stat.pkl`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvStats {
    /// Statistics of observations.
    pub ob_rms: RunningMeanStd,

    /// Statistics of returns, if they were tracked.
    pub ret_rms: Option<RunningMeanStd>,
}

impl EnvStats {
    /// Path of the statistics file belonging to `model_path`.
    pub fn path_for(model_path: &Path) -> PathBuf {
        let mut path = model_path.as_os_str().to_owned();
        path.push(".env_stat.pkl");
        PathBuf::from(path)
    }

    /// Loads the statistics stored for `model_path`.
    ///
    /// A missing or unreadable file is a [`DrexError::Load`].
    pub fn load(model_path: &Path) -> Result<Self> {
        let path = Self::path_for(model_path);
        let file = File::open(&path).map_err(|e| DrexError::load(&path, e))?;
        let stats = bincode::deserialize_from(BufReader::new(file))
            .map_err(|e| DrexError::load(&path, e))?;
        Ok(stats)
    }

    /// Saves the statistics for `model_path`.
    pub fn save(&self, model_path: &Path) -> Result<()> {
        let path = Self::path_for(model_path);
        let file =
            File::create(&path).with_context(|| format!("Failed to create {:?}", path))?;
        bincode::serialize_into(BufWriter::new(file), self)?;
        Ok(())
    }
}

/// Observation rescaling parameters.
///
/// Applies `clip((obs - mean) / sqrt(variance + epsilon), -clip_bound, clip_bound)`
/// along the last axis of an observation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NormalizationStats {
    mean: Vec<f32>,
    variance: Vec<f32>,
    clip_bound: f32,
    epsilon: f32,
}

impl NormalizationStats {
    /// Default clipping bound of normalized observations.
    pub const CLIP_BOUND: f32 = 10.0;

    /// Default constant added to the variance.
    pub const EPSILON: f32 = 1e-8;

    /// Constructs the parameters. `mean` and `variance` must have the same length.
    pub fn new(mean: Vec<f32>, variance: Vec<f32>, clip_bound: f32, epsilon: f32) -> Result<Self> {
        if mean.len() != variance.len() {
            return Err(DrexError::config(format!(
                "mean has {} elements but variance has {}",
                mean.len(),
                variance.len()
            ))
            .into());
        }
        Ok(Self {
            mean,
            variance,
            clip_bound,
            epsilon,
        })
    }

    /// Parameters from running statistics with the default bound and epsilon.
    pub fn from_running(rms: &RunningMeanStd) -> Self {
        Self {
            mean: rms.mean.iter().map(|&x| x as f32).collect(),
            variance: rms.var.iter().map(|&x| x as f32).collect(),
            clip_bound: Self::CLIP_BOUND,
            epsilon: Self::EPSILON,
        }
    }

    /// Sets the clipping bound.
    pub fn clip_bound(mut self, v: f32) -> Self {
        self.clip_bound = v;
        self
    }

    /// Sets the constant added to the variance.
    pub fn epsilon(mut self, v: f32) -> Self {
        self.epsilon = v;
        self
    }

    /// Loads the observation statistics stored for `model_path`.
    pub fn load(model_path: &Path) -> Result<Self> {
        Ok(Self::from_running(&EnvStats::load(model_path)?.ob_rms))
    }

    /// Dimensionality of observations these parameters apply to.
    pub fn dim(&self) -> usize {
        self.mean.len()
    }

    /// Returns the rescaled observation; the input is left untouched.
    pub fn rescale(&self, obs: &ArrayD<f32>) -> Result<ArrayD<f32>> {
        let last = obs.ndim().checked_sub(1).context("Cannot rescale a scalar")?;
        if obs.shape()[last] != self.dim() {
            return Err(DrexError::config(format!(
                "observation of shape {:?} does not match statistics of dimension {}",
                obs.shape(),
                self.dim()
            ))
            .into());
        }

        let mut out = obs.clone();
        for mut lane in out.lanes_mut(Axis(last)) {
            for (i, x) in lane.iter_mut().enumerate() {
                let std = (self.variance[i] + self.epsilon).sqrt();
                *x = ((*x - self.mean[i]) / std).max(-self.clip_bound).min(self.clip_bound);
            }
        }
        Ok(out)
    }
}
