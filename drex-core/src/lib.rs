#![warn(missing_docs)]
//! Core of the policy evaluation harness.
//!
//! The crate provides the vectorized environment interface ([`VecEnv`]), the
//! capability shared by all agents ([`Agent`]), the wrappers assembled by
//! [`EnvComposer`] and the episode loop ([`Rollout`]) that drives an agent
//! through a number of episodes.
//!
//! ```mermaid
//! graph LR
//!     VecEnv --> Obs
//!     Obs --> Agent
//!     Agent --> Act
//!     Act --> VecEnv
//! ```
pub mod dummy;
pub mod error;
pub mod wrapper;

mod base;
pub use base::{Act, Agent, EnvMaker, Obs, Space, Step, VecEnv};

mod composer;
pub use composer::{EnvComposer, EnvComposerConfig};

mod env_id;
pub use env_id::{env_id, EnvType};

mod normalize;
pub use normalize::{EnvStats, NormalizationStats, RunningMeanStd};

mod random;
pub use random::RandomAgent;

mod rollout;
pub use rollout::{ClosingEnv, EpisodeResult, Rollout, RolloutConfig};

mod score_mask;
pub use score_mask::ScoreMask;
