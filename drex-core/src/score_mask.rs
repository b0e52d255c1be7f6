//! Blacking out of the score area in atari frames.
use ndarray::{ArrayD, Axis, Slice};

/// Rows at the top and bottom of a frame that show the score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreMask {
    /// Number of rows from the top.
    pub top: usize,

    /// Number of rows from the bottom.
    pub bottom: usize,
}

impl ScoreMask {
    /// Mask of a known game, given by its lowercase name.
    pub fn for_game(env_name: &str) -> Option<Self> {
        let (top, bottom) = match env_name {
            "spaceinvaders" | "breakout" | "pong" | "montezumarevenge" => (10, 0),
            "beamrider" => (16, 11),
            "enduro" => (0, 14),
            "hero" => (0, 30),
            "qbert" => (12, 0),
            "seaquest" => (12, 16),
            "mspacman" => (0, 15),
            "videopinball" => (15, 0),
            _ => return None,
        };
        Some(Self { top, bottom })
    }

    /// Returns a copy of `obs` with the masked rows set to zero.
    ///
    /// Rows are taken along the height axis, the second to last one.
    pub fn apply(&self, obs: &ArrayD<f32>) -> ArrayD<f32> {
        let mut out = obs.clone();
        if out.ndim() < 2 {
            return out;
        }
        let axis = Axis(out.ndim() - 2);
        let height = out.len_of(axis);
        let top = self.top.min(height);
        let bottom = self.bottom.min(height);

        out.slice_axis_mut(axis, Slice::from(..top)).fill(0.0);
        out.slice_axis_mut(axis, Slice::from(height - bottom..)).fill(0.0);
        out
    }
}
