//! Errors in the library.
use std::{fmt::Display, path::PathBuf};
use thiserror::Error;

/// Errors in the library.
///
/// Functions return [`anyhow::Result`]; these variants can be recovered with
/// `err.downcast_ref::<DrexError>()`.
#[derive(Error, Debug)]
pub enum DrexError {
    /// Unsupported environment type or an invalid combination of options.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Model parameters or normalization statistics could not be loaded.
    #[error("Failed to load {path:?}: {reason}")]
    Load {
        /// The file that was read.
        path: PathBuf,
        /// What went wrong.
        reason: String,
    },

    /// An agent was asked for an action before its parameters were loaded.
    #[error("Agent used before its parameters were loaded")]
    NotLoaded,

    /// The environment keeps no persisted running statistics.
    #[error("Environment has no persisted statistics")]
    StatsUnsupported,
}

impl DrexError {
    /// Shorthand for [`DrexError::Config`].
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Shorthand for [`DrexError::Load`].
    pub fn load(path: impl Into<PathBuf>, reason: impl Display) -> Self {
        Self::Load {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

/// Returns `true` if `err` is [`DrexError::StatsUnsupported`].
pub fn is_stats_unsupported(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<DrexError>(),
        Some(DrexError::StatsUnsupported)
    )
}
