//! Recording of episodes as image sequences.
use crate::{Act, Obs, Space, Step, VecEnv};
use anyhow::{Context, Result};
use image::RgbImage;
use log::{info, warn};
use std::{
    fs,
    path::{Path, PathBuf},
};

struct Recording {
    dir: PathBuf,
    n_frames: usize,
}

/// Records frames rendered by the wrapped environment.
///
/// A recording starts at every reset and whenever `trigger(step_id)` holds
/// while nothing is being recorded. It stops at the next reset, at
/// [`VecEnv::close`], or once more than `video_length` frames were captured.
/// Frames are stored as PNG files in
/// `<directory>/drex.video.video<step_id>/frame<n>.png`.
pub struct VecVideoRecorder {
    env: Box<dyn VecEnv>,
    directory: PathBuf,
    trigger: Box<dyn Fn(usize) -> bool>,
    video_length: usize,
    step_id: usize,
    recording: Option<Recording>,
    disabled: bool,
}

impl VecVideoRecorder {
    const PREFIX: &'static str = "drex.video";

    /// Wraps `env`, creating `directory` if it does not exist.
    pub fn new(
        env: Box<dyn VecEnv>,
        directory: impl Into<PathBuf>,
        trigger: impl Fn(usize) -> bool + 'static,
        video_length: usize,
    ) -> Result<Self> {
        let directory = directory.into();
        fs::create_dir_all(&directory)
            .with_context(|| format!("Failed to create video directory {:?}", directory))?;

        Ok(Self {
            env,
            directory,
            trigger: Box::new(trigger),
            video_length,
            step_id: 0,
            recording: None,
            disabled: false,
        })
    }

    /// Returns `true` while frames are captured.
    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// Directory of the current recording.
    pub fn recording_dir(&self) -> Option<&Path> {
        self.recording.as_ref().map(|r| r.dir.as_path())
    }

    fn start(&mut self) -> Result<()> {
        self.stop();
        if self.disabled {
            return Ok(());
        }

        let dir = self
            .directory
            .join(format!("{}.video{:06}", Self::PREFIX, self.step_id));
        fs::create_dir_all(&dir)?;
        self.recording = Some(Recording { dir, n_frames: 0 });
        self.capture()
    }

    fn capture(&mut self) -> Result<()> {
        let frame = match self.env.render_frame()? {
            Some(frame) => frame,
            None => {
                warn!(
                    "{} does not produce frames, video recording is disabled",
                    self.env.name()
                );
                self.disabled = true;
                self.recording = None;
                return Ok(());
            }
        };

        if let Some(recording) = self.recording.as_mut() {
            let path = recording
                .dir
                .join(format!("frame{:06}.png", recording.n_frames));
            frame.save(&path)?;
            recording.n_frames += 1;
        }
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(recording) = self.recording.take() {
            info!(
                "Saved {} frames to {:?}",
                recording.n_frames, recording.dir
            );
        }
    }
}

impl VecEnv for VecVideoRecorder {
    fn name(&self) -> &'static str {
        "VecVideoRecorder"
    }

    fn inner(&self) -> Option<&dyn VecEnv> {
        Some(self.env.as_ref())
    }

    fn observation_shape(&self) -> Vec<usize> {
        self.env.observation_shape()
    }

    fn action_space(&self) -> &Space {
        self.env.action_space()
    }

    fn reset(&mut self) -> Result<Obs> {
        let obs = self.env.reset()?;
        self.start()?;
        Ok(obs)
    }

    fn step(&mut self, act: &Act) -> Result<Step> {
        let step = self.env.step(act)?;
        self.step_id += 1;

        if self.recording.is_some() {
            self.capture()?;
            let n_frames = self.recording.as_ref().map_or(0, |r| r.n_frames);
            if n_frames > self.video_length {
                self.stop();
            }
        } else if !self.disabled && (self.trigger)(self.step_id) {
            self.start()?;
        }

        Ok(step)
    }

    fn render(&mut self) -> Result<()> {
        self.env.render()
    }

    fn render_frame(&mut self) -> Result<Option<RgbImage>> {
        self.env.render_frame()
    }

    fn load_stats(&mut self, model_path: &Path) -> Result<()> {
        self.env.load_stats(model_path)
    }

    fn close(&mut self) -> Result<()> {
        self.stop();
        self.env.close()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dummy::ScriptedEnv;
    use tempdir::TempDir;

    fn count_frames(dir: &Path) -> usize {
        fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_records_episode() -> Result<()> {
        let tmp = TempDir::new("video_recorder")?;
        let env = ScriptedEnv::new(vec![1.0; 3]).with_frames();
        let mut env = VecVideoRecorder::new(Box::new(env), tmp.path(), |_| true, 100)?;

        env.reset()?;
        let dir = env.recording_dir().unwrap().to_path_buf();
        assert_eq!(dir, tmp.path().join("drex.video.video000000"));
        for _ in 0..3 {
            env.step(&Act::Discrete(0))?;
        }
        env.close()?;

        assert!(!env.is_recording());
        assert_eq!(count_frames(&dir), 4);
        assert!(dir.join("frame000003.png").exists());
        Ok(())
    }

    #[test]
    fn test_video_length() -> Result<()> {
        let tmp = TempDir::new("video_recorder")?;
        let env = ScriptedEnv::new(vec![1.0; 10]).with_frames();
        let mut env = VecVideoRecorder::new(Box::new(env), tmp.path(), |_| false, 2)?;

        env.reset()?;
        env.step(&Act::Discrete(0))?;
        assert!(env.is_recording());
        env.step(&Act::Discrete(0))?;
        assert!(!env.is_recording());
        Ok(())
    }

    #[test]
    fn test_no_frames_disables_recording() -> Result<()> {
        let tmp = TempDir::new("video_recorder")?;
        let env = ScriptedEnv::new(vec![1.0; 3]);
        let mut env = VecVideoRecorder::new(Box::new(env), tmp.path(), |_| true, 100)?;

        env.reset()?;
        assert!(!env.is_recording());
        let step = env.step(&Act::Discrete(0))?;
        assert_eq!(step.reward, vec![1.0]);
        assert!(!env.is_recording());
        Ok(())
    }
}
