//! Wrapper of gym environments implemented in Python.
use crate::GymEnvConfig;
use anyhow::{Context, Result};
use drex_core::{Act, EnvType, Obs, Space, Step, VecEnv};
use image::RgbImage;
use log::{info, trace};
use ndarray::Axis;
use numpy::{PyArray1, PyArray3, PyArrayDyn};
use pyo3::{
    types::{IntoPyDict, PyModule},
    IntoPy, PyObject, Python, ToPyObject,
};

const HELPER: &str = r#"
def make(env_id, env_type, render_mode):
    import gymnasium as gym
    kwargs = {} if render_mode is None else {"render_mode": render_mode}
    if env_type == "atari":
        import ale_py
        gym.register_envs(ale_py)
        env = gym.make(env_id, **kwargs)
        env = gym.wrappers.AtariPreprocessing(
            env,
            noop_max=30,
            frame_skip=4,
            screen_size=84,
            terminal_on_life_loss=False,
            grayscale_obs=True,
        )
    else:
        env = gym.make(env_id, **kwargs)
    return env

def uses_fire(env):
    meanings = env.unwrapped.get_action_meanings()
    return len(meanings) >= 3 and meanings[1] == "FIRE"

def fire_reset(env, seed):
    obs, _ = env.reset(seed=seed)
    for action in (1, 2):
        obs, _, terminated, truncated, _ = env.step(action)
        if terminated or truncated:
            obs, _ = env.reset()
    return obs

def action_space(env):
    import numpy as np
    import gymnasium as gym
    space = env.action_space
    if isinstance(space, gym.spaces.Discrete):
        return ("discrete", int(space.n), [], [], [])
    low = [float(x) for x in np.asarray(space.low).flatten()]
    high = [float(x) for x in np.asarray(space.high).flatten()]
    return ("box", 0, low, high, [int(d) for d in space.shape])

def observation_shape(env):
    return [int(d) for d in env.observation_space.shape]

def reset(env, seed, fire):
    import numpy as np
    if fire:
        obs = fire_reset(env, seed)
    else:
        obs, _ = env.reset(seed=seed)
    return np.asarray(obs, dtype=np.float32)

def step(env, action):
    import numpy as np
    obs, reward, terminated, truncated, _ = env.step(action)
    return np.asarray(obs, dtype=np.float32), float(reward), bool(terminated), bool(truncated)

def frame(env):
    import numpy as np
    if env.render_mode != "rgb_array":
        return None
    f = env.render()
    if f is None:
        return None
    return np.ascontiguousarray(f, dtype=np.uint8)
"#;

/// An environment in [Gymnasium](https://gymnasium.farama.org).
///
/// Observations have a leading batch axis of length 1, e.g., `[1, 84, 84]` for
/// atari. The environment does not reset itself at the end of an episode.
///
/// Atari games with a FIRE action press FIRE and then action 2 after every
/// reset, resetting again if either step ends the episode.
pub struct GymEnv {
    env: PyObject,

    helper: PyObject,

    action_space: Space,

    observation_shape: Vec<usize>,

    render_mode: Option<String>,

    fire_reset: bool,

    /// Initial seed.
    ///
    /// This value will be used at the first call of the reset method.
    initial_seed: Option<i64>,

    closed: bool,
}

impl GymEnv {
    /// Constructs [`GymEnv`].
    ///
    /// * `seed` - The seed value of the random number generator.
    ///   This value will be used at the first call of the reset method.
    pub fn build(config: &GymEnvConfig, seed: i64) -> Result<Self> {
        Python::with_gil(|py| -> Result<Self> {
            // sys.argv is used by pyglet library, which is responsible for rendering.
            // Depending on the python interpreter, however, sys.argv can be empty.
            // For that case, sys argv is set here.
            // See https://github.com/PyO3/pyo3/issues/1241#issuecomment-715952517
            let locals = [("sys", py.import("sys")?)].into_py_dict(py);
            let _ = py.eval("sys.argv.insert(0, 'GymEnv')", None, Some(&locals))?;
            let ver = py.eval("sys.version", None, Some(&locals))?;
            info!("Initialize GymEnv");
            info!("Python version = {}", ver);

            let helper = PyModule::from_code(py, HELPER, "drex_gym.py", "drex_gym")?;
            let env_type = match config.env_type {
                EnvType::Atari => "atari",
                EnvType::Mujoco => "mujoco",
            };
            let env = helper
                .getattr("make")?
                .call1((config.name.as_str(), env_type, config.render_mode.clone()))
                .with_context(|| format!("Failed to make {}", config.name))?;

            let (kind, n, low, high, shape): (String, i64, Vec<f32>, Vec<f32>, Vec<usize>) =
                helper.getattr("action_space")?.call1((env,))?.extract()?;
            let action_space = match kind.as_str() {
                "discrete" => Space::Discrete { n },
                _ => Space::Box { low, high, shape },
            };
            let observation_shape: Vec<usize> =
                helper.getattr("observation_shape")?.call1((env,))?.extract()?;
            let fire_reset = match config.env_type {
                EnvType::Atari => helper.getattr("uses_fire")?.call1((env,))?.extract()?,
                EnvType::Mujoco => false,
            };
            info!("Action space = {:?}", action_space);
            info!("Observation shape = {:?}", observation_shape);

            Ok(GymEnv {
                env: env.into(),
                helper: helper.to_object(py),
                action_space,
                observation_shape,
                render_mode: config.render_mode.clone(),
                fire_reset,
                initial_seed: Some(seed),
                closed: false,
            })
        })
    }

    fn to_obs(obs: &PyArrayDyn<f32>) -> Obs {
        Obs(obs.to_owned_array().insert_axis(Axis(0)))
    }

    fn act_to_pyobj(py: Python, act: &Act) -> PyObject {
        match act {
            Act::Discrete(a) => a.into_py(py),
            Act::Continuous(a) => PyArray1::<f32>::from_slice(py, a).into_py(py),
        }
    }
}

impl VecEnv for GymEnv {
    fn name(&self) -> &'static str {
        "GymEnv"
    }

    fn observation_shape(&self) -> Vec<usize> {
        self.observation_shape.clone()
    }

    fn action_space(&self) -> &Space {
        &self.action_space
    }

    /// Resets the environment and returns an observation.
    ///
    /// The seed given at construction is applied at the first reset only.
    fn reset(&mut self) -> Result<Obs> {
        trace!("GymEnv::reset()");
        let seed = self.initial_seed.take();

        Python::with_gil(|py| -> Result<Obs> {
            let obs = self
                .helper
                .call_method1(py, "reset", (&self.env, seed, self.fire_reset))?;
            let obs: &PyArrayDyn<f32> = obs.extract(py)?;
            Ok(Self::to_obs(obs))
        })
    }

    fn step(&mut self, act: &Act) -> Result<Step> {
        trace!("GymEnv::step()");

        Python::with_gil(|py| -> Result<Step> {
            let a_py = Self::act_to_pyobj(py, act);
            let ret = self.helper.call_method1(py, "step", (&self.env, a_py))?;
            let (obs, reward, terminated, truncated): (&PyArrayDyn<f32>, f32, bool, bool) =
                ret.extract(py)?;

            Ok(Step::new(
                Self::to_obs(obs),
                act.clone(),
                vec![reward],
                vec![terminated as i8],
                vec![truncated as i8],
            ))
        })
    }

    fn render(&mut self) -> Result<()> {
        if self.render_mode.as_deref() == Some("human") {
            Python::with_gil(|py| self.env.call_method0(py, "render"))?;
        }
        Ok(())
    }

    fn render_frame(&mut self) -> Result<Option<RgbImage>> {
        Python::with_gil(|py| -> Result<Option<RgbImage>> {
            let frame = self.helper.call_method1(py, "frame", (&self.env,))?;
            let frame: Option<&PyArray3<u8>> = frame.extract(py)?;
            let frame = match frame {
                Some(frame) => frame.to_owned_array(),
                None => return Ok(None),
            };
            let (h, w, _) = frame.dim();
            let raw: Vec<u8> = frame.iter().copied().collect();
            let img = RgbImage::from_raw(w as u32, h as u32, raw)
                .context("Frame is not an RGB image")?;
            Ok(Some(img))
        })
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        info!("Close GymEnv");
        Python::with_gil(|py| self.env.call_method0(py, "close"))?;
        Ok(())
    }
}
