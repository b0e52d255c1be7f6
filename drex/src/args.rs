use clap::Parser;

/// Evaluates a pretrained policy on a Gymnasium environment.
#[derive(Parser, Debug, Clone)]
#[command(version, about)]
pub struct Args {
    /// Name of the environment, e.g., pong or halfcheetah
    #[arg(long = "env_name", default_value = "")]
    pub env_name: String,

    /// Type of the environment, atari or mujoco
    #[arg(long = "env_type", default_value = "atari")]
    pub env_type: String,

    /// Path of the model parameters
    #[arg(long = "model_path", default_value = "")]
    pub model_path: String,

    /// Number of episodes
    #[arg(long = "episode_count", default_value = "100")]
    pub episode_count: String,

    /// Record videos
    #[arg(long = "record_video", default_value_t = false)]
    pub record_video: bool,

    /// Render the environment at every step
    #[arg(long, default_value_t = false)]
    pub render: bool,

    /// Sample actions instead of taking the most likely one
    #[arg(long, default_value_t = false)]
    pub stochastic: bool,

    /// Take random actions
    #[arg(long, default_value_t = false)]
    pub random: bool,

    /// Show observations before and after masking the score, one step at a time
    #[arg(long = "debug_crop", default_value_t = false)]
    pub debug_crop: bool,

    /// Take action 0 at every step
    #[arg(long = "no_op", default_value_t = false)]
    pub no_op: bool,

    /// Normalize observations in the agent instead of the environment
    #[arg(long, default_value_t = false)]
    pub isolated: bool,

    /// Run inference on the CPU
    #[arg(long, default_value_t = false)]
    pub cpu: bool,

    /// Random seed
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub seed: i64,

    /// Directory of recorded videos
    #[arg(long = "video_dir", default_value = "./videos/")]
    pub video_dir: String,

    /// Print the configuration and exit
    #[arg(long = "show_config", default_value_t = false)]
    pub show_config: bool,
}
