//! Step-by-step inspection of the score mask.
use anyhow::{anyhow, bail, Context, Result};
use drex_core::{Obs, ScoreMask};
use image::{DynamicImage, GrayImage, Luma};
use log::{info, warn};
use ndarray::{ArrayD, Axis, Ix2};
use std::io::BufRead;

const DISPLAY_WIDTH: u32 = 42;

/// Shows the newest frame of every observation before and after masking the
/// score, then waits for Enter.
///
/// Frames are drawn in the terminal with [viuer](https://crates.io/crates/viuer).
/// Nothing is fed back to the agent.
pub struct DebugCrop {
    mask: Option<ScoreMask>,
    viewer: viuer::Config,
}

impl DebugCrop {
    /// Looks up the mask of `env_name`.
    pub fn new(env_name: &str) -> Self {
        let mask = ScoreMask::for_game(env_name);
        match &mask {
            Some(mask) => info!("Score mask of {}: {:?}", env_name, mask),
            None => warn!("No score mask for {}, the score is not masked", env_name),
        }
        Self {
            mask,
            viewer: viuer::Config {
                width: Some(DISPLAY_WIDTH),
                ..Default::default()
            },
        }
    }

    /// Newest frame of `obs` before and after masking.
    pub fn crop(&self, obs: &Obs) -> Result<(GrayImage, GrayImage)> {
        let before = newest_frame(&obs.0)?;
        let after = match &self.mask {
            Some(mask) => newest_frame(&mask.apply(&obs.0))?,
            None => before.clone(),
        };
        Ok((before, after))
    }

    /// Displays the frames of `obs` and blocks until a line is read from stdin.
    pub fn inspect(&mut self, obs: &Obs) -> Result<()> {
        info!("Observation shape = {:?}", obs.0.shape());
        let (before, after) = self.crop(obs)?;
        self.show("before", before)?;
        self.show("after", after)?;

        info!("Press Enter to continue");
        let mut line = String::new();
        std::io::stdin()
            .lock()
            .read_line(&mut line)
            .context("Failed to read from stdin")?;
        Ok(())
    }

    fn show(&self, title: &str, frame: GrayImage) -> Result<()> {
        info!("{} ({}x{})", title, frame.width(), frame.height());
        viuer::print(&DynamicImage::ImageLuma8(frame), &self.viewer)
            .map_err(|e| anyhow!("Failed to display the frame: {}", e))?;
        Ok(())
    }
}

/// The last frame along every leading axis, as an 8-bit grayscale image.
fn newest_frame(obs: &ArrayD<f32>) -> Result<GrayImage> {
    if obs.ndim() < 2 {
        bail!("Observation of shape {:?} is not an image", obs.shape());
    }
    let mut frame = obs.view();
    while frame.ndim() > 2 {
        let last = frame
            .len_of(Axis(0))
            .checked_sub(1)
            .context("Observation is empty")?;
        frame = frame.index_axis_move(Axis(0), last);
    }
    let frame = frame.into_dimensionality::<Ix2>()?;
    let (h, w) = frame.dim();

    Ok(GrayImage::from_fn(w as u32, h as u32, |x, y| {
        Luma([frame[[y as usize, x as usize]].clamp(0.0, 255.0) as u8])
    }))
}
