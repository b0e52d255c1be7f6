//! Construction of [`GymEnv`] from the composer configuration.
use crate::{GymEnv, GymEnvConfig};
use anyhow::Result;
use drex_core::{EnvComposerConfig, EnvMaker, VecEnv};
use log::warn;

/// Makes [`GymEnv`] base environments for [`drex_core::EnvComposer`].
#[derive(Clone, Copy, Debug, Default)]
pub struct GymEnvMaker;

impl GymEnvMaker {
    /// `rgb_array` when recording video, `human` when rendering on screen.
    ///
    /// Recording takes precedence over rendering.
    fn render_mode(record_video: bool, render: bool) -> Option<&'static str> {
        match (record_video, render) {
            (true, render) => {
                if render {
                    warn!("Rendering on screen is disabled while recording video");
                }
                Some("rgb_array")
            }
            (false, true) => Some("human"),
            (false, false) => None,
        }
    }
}

impl EnvMaker for GymEnvMaker {
    fn make(&self, config: &EnvComposerConfig) -> Result<Box<dyn VecEnv>> {
        let render_mode = Self::render_mode(config.record_video, config.render);
        let gym_config = GymEnvConfig::default()
            .name(config.env_id.clone())
            .env_type(config.env_type)
            .render_mode(render_mode.map(String::from));

        Ok(Box::new(GymEnv::build(&gym_config, config.seed)?))
    }
}
