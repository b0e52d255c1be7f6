//! A wrapper of [Gymnasium](https://gymnasium.farama.org) environments on Python.
//!
//! [`GymEnv`] is a base environment for [`drex_core::EnvComposer`] based on
//! [`PyO3`](https://github.com/PyO3/pyo3). Atari environments are created with
//! the ALE and preprocessed in Python (no-op reset, frame skipping, 84x84
//! grayscale frames); reward clipping and episode-life semantics are not
//! applied, so full-game episodes are evaluated.
//!
//! Observations are converted to `f32` in Python and passed to Rust as
//! [`ndarray::ArrayD`] with a leading batch axis of length 1.
//!
//! [`GymEnvMaker`] plugs the environment into [`drex_core::EnvComposer`].
mod base;
mod config;
mod maker;
pub use base::GymEnv;
pub use config::GymEnvConfig;
pub use maker::GymEnvMaker;
