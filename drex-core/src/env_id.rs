//! Environment types and identifiers.
use crate::error::DrexError;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Family of environments.
///
/// The type selects the wrapper chain built by [`EnvComposer`](crate::EnvComposer)
/// and the network profile of policy agents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvType {
    /// Discrete-action environments with visual observations.
    Atari,

    /// Continuous-control environments with vector observations.
    Mujoco,
}

impl FromStr for EnvType {
    type Err = DrexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "atari" => Ok(Self::Atari),
            "mujoco" => Ok(Self::Mujoco),
            _ => Err(DrexError::config(format!("not supported env type: {:?}", s))),
        }
    }
}

impl fmt::Display for EnvType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Atari => write!(f, "atari"),
            Self::Mujoco => write!(f, "mujoco"),
        }
    }
}

const ATARI_SUFFIX: &str = "NoFrameskip-v4";
const MUJOCO_SUFFIX: &str = "-v4";

/// Maps a logical environment name to the identifier of the environment.
///
/// For atari, `spaceinvaders`, `mspacman`, `videopinball` and `beamrider` are
/// mapped to fixed identifiers, and any other name `foo` to `FooNoFrameskip-v4`.
/// For mujoco, the lowercase names of the standard tasks are mapped to their `-v4`
/// identifiers and any other name `foo` to `Foo-v4`.
pub fn env_id(env_name: &str, env_type: EnvType) -> Result<String, DrexError> {
    if env_name.is_empty() {
        return Err(DrexError::config("the name of the environment is empty"));
    }

    let id = match env_type {
        EnvType::Atari => match env_name {
            "spaceinvaders" => "SpaceInvadersNoFrameskip-v4".to_string(),
            "mspacman" => "MsPacmanNoFrameskip-v4".to_string(),
            "videopinball" => "VideoPinballNoFrameskip-v4".to_string(),
            "beamrider" => "BeamRiderNoFrameskip-v4".to_string(),
            _ => capitalize(env_name) + ATARI_SUFFIX,
        },
        EnvType::Mujoco => match env_name {
            "halfcheetah" => "HalfCheetah-v4".to_string(),
            "hopper" => "Hopper-v4".to_string(),
            "walker2d" => "Walker2d-v4".to_string(),
            "ant" => "Ant-v4".to_string(),
            "humanoid" => "Humanoid-v4".to_string(),
            "swimmer" => "Swimmer-v4".to_string(),
            "reacher" => "Reacher-v4".to_string(),
            "invertedpendulum" => "InvertedPendulum-v4".to_string(),
            "inverteddoublependulum" => "InvertedDoublePendulum-v4".to_string(),
            _ => capitalize(env_name) + MUJOCO_SUFFIX,
        },
    };

    Ok(id)
}

/// Upper-cases the first character, leaving the rest untouched.
fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
