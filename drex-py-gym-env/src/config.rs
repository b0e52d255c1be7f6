//! Configuration of [`GymEnv`](super::GymEnv).
use anyhow::Result;
use drex_core::EnvType;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
/// Configuration of [`GymEnv`](super::GymEnv).
pub struct GymEnvConfig {
    pub(super) name: String,
    pub(super) env_type: EnvType,
    pub(super) render_mode: Option<String>,
}

impl Default for GymEnvConfig {
    fn default() -> Self {
        Self {
            name: "".to_string(),
            env_type: EnvType::Atari,
            render_mode: None,
        }
    }
}

impl GymEnvConfig {
    /// Set the name of the environment.
    pub fn name(mut self, name: String) -> Self {
        self.name = name;
        self
    }

    /// Set the type of the environment, which selects preprocessing.
    pub fn env_type(mut self, v: EnvType) -> Self {
        self.env_type = v;
        self
    }

    /// Set the render mode, `human` or `rgb_array`.
    pub fn render_mode(mut self, render_mode: Option<String>) -> Self {
        self.render_mode = render_mode;
        self
    }

    /// Loads [`GymEnvConfig`] from YAML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`GymEnvConfig`] as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_gym_env_config() -> Result<()> {
        let config = GymEnvConfig::default()
            .name("PongNoFrameskip-v4".to_string())
            .render_mode(Some("rgb_array".to_string()));

        let dir = TempDir::new("gym_env_config")?;
        let path = dir.path().join("gym_env_config.yaml");
        config.save(&path)?;
        assert_eq!(GymEnvConfig::load(&path)?, config);
        Ok(())
    }
}
