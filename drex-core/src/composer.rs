//! Assembly of the wrapper chain around a base environment.
use crate::{
    error::{is_stats_unsupported, DrexError},
    wrapper::{VecFrameStack, VecNormalize, VecNormalizeConfig, VecVideoRecorder},
    EnvMaker, EnvType, NormalizationStats, VecEnv,
};
use anyhow::Result;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Configuration of [`EnvComposer`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvComposerConfig {
    /// Identifier of the environment, e.g. `PongNoFrameskip-v4`.
    pub env_id: String,

    /// Family of the environment.
    pub env_type: EnvType,

    /// Records episodes as image sequences.
    pub record_video: bool,

    /// Directory of recorded videos.
    pub video_dir: PathBuf,

    /// Maximum number of frames in a recording.
    pub video_length: usize,

    /// Number of stacked frames for atari.
    pub n_stack: usize,

    /// Clipping bound of normalized observations for mujoco.
    pub clip_ob: f32,

    /// Renders the environment on screen.
    pub render: bool,

    /// Random seed of the environment.
    pub seed: i64,

    /// Model path from which running statistics are loaded, if any.
    pub stats_path: Option<PathBuf>,
}

impl Default for EnvComposerConfig {
    fn default() -> Self {
        Self {
            env_id: "".to_string(),
            env_type: EnvType::Atari,
            record_video: false,
            video_dir: PathBuf::from("./videos/"),
            video_length: 20000,
            n_stack: 4,
            clip_ob: NormalizationStats::CLIP_BOUND,
            render: false,
            seed: 0,
            stats_path: None,
        }
    }
}

impl EnvComposerConfig {
    /// Sets the identifier of the environment.
    pub fn env_id(mut self, v: impl Into<String>) -> Self {
        self.env_id = v.into();
        self
    }

    /// Sets the family of the environment.
    pub fn env_type(mut self, v: EnvType) -> Self {
        self.env_type = v;
        self
    }

    /// Enables video recording.
    pub fn record_video(mut self, v: bool) -> Self {
        self.record_video = v;
        self
    }

    /// Sets the directory of recorded videos.
    pub fn video_dir(mut self, v: impl Into<PathBuf>) -> Self {
        self.video_dir = v.into();
        self
    }

    /// Sets the maximum number of frames in a recording.
    pub fn video_length(mut self, v: usize) -> Self {
        self.video_length = v;
        self
    }

    /// Sets the number of stacked frames.
    pub fn n_stack(mut self, v: usize) -> Self {
        self.n_stack = v;
        self
    }

    /// Sets the clipping bound of normalized observations.
    pub fn clip_ob(mut self, v: f32) -> Self {
        self.clip_ob = v;
        self
    }

    /// Enables on-screen rendering.
    pub fn render(mut self, v: bool) -> Self {
        self.render = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: i64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the model path of running statistics.
    pub fn stats_path(mut self, v: Option<PathBuf>) -> Self {
        self.stats_path = v;
        self
    }

    /// Loads [`EnvComposerConfig`] from YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`EnvComposerConfig`] as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Builds the wrapped environment used for evaluation.
///
/// From the inside out, the chain is the base environment, the video recorder
/// when enabled, and then frame stacking for atari or frozen observation
/// normalization for mujoco.
pub struct EnvComposer {
    config: EnvComposerConfig,
}

impl EnvComposer {
    /// Constructs a composer.
    pub fn new(config: EnvComposerConfig) -> Self {
        Self { config }
    }

    /// The configuration.
    pub fn config(&self) -> &EnvComposerConfig {
        &self.config
    }

    /// Builds the base environment with `maker` and wraps it.
    ///
    /// If `stats_path` is set, running statistics are loaded into the chain.
    /// A chain without statistics is accepted silently; any other failure
    /// closes the environment and is returned.
    pub fn build<M: EnvMaker + ?Sized>(&self, maker: &M) -> Result<Box<dyn VecEnv>> {
        let config = &self.config;
        if config.env_type == EnvType::Atari && config.n_stack == 0 {
            return Err(DrexError::config("n_stack must be positive for atari environments").into());
        }
        let mut env = maker.make(config)?;

        if config.record_video {
            env = Box::new(VecVideoRecorder::new(
                env,
                &config.video_dir,
                |_| true,
                config.video_length,
            )?);
        }

        env = match config.env_type {
            EnvType::Atari => Box::new(VecFrameStack::new(env, config.n_stack)?),
            EnvType::Mujoco => {
                let norm_config = VecNormalizeConfig::default()
                    .eval(true)
                    .clip_ob(config.clip_ob);
                Box::new(VecNormalize::new(env, norm_config))
            }
        };
        info!("Environment: {}", env.wrapper_chain().join(" > "));

        if let Some(model_path) = &config.stats_path {
            match env.load_stats(model_path) {
                Ok(()) => {}
                Err(e) if is_stats_unsupported(&e) => {}
                Err(e) => {
                    if let Err(close_err) = env.close() {
                        warn!("Failed to close environment: {}", close_err);
                    }
                    return Err(e);
                }
            }
        }

        Ok(env)
    }
}
