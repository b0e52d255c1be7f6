//! Evaluation of pretrained policies from the command line.
//!
//! The `drex-eval` binary resolves its arguments into an [`EvalConfig`], builds
//! the environment chain with [`drex_core::EnvComposer`], selects an agent and
//! prints `<step_count> <accumulated_reward>` for every finished episode.
//!
//! The environment is created by an [`EnvMaker`](drex_core::EnvMaker); the
//! binary uses the Python Gymnasium bridge, tests use scripted environments.
mod args;
mod config;
mod debug_crop;
mod eval;
pub use args::Args;
pub use config::{AgentKind, EvalConfig};
pub use debug_crop::DebugCrop;
pub use eval::{build_agent, run};
