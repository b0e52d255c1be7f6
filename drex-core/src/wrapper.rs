//! Wrappers of vectorized environments.
//!
//! Each wrapper owns the environment it wraps and forwards what it does not
//! change, including [`VecEnv::load_stats`](crate::VecEnv::load_stats) and
//! [`VecEnv::close`](crate::VecEnv::close).
mod frame_stack;
mod normalize;
mod video_recorder;
pub use frame_stack::VecFrameStack;
pub use normalize::{VecNormalize, VecNormalizeConfig};
pub use video_recorder::VecVideoRecorder;
