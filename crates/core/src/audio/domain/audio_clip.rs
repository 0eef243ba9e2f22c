use std::path::{Path, PathBuf};

/// An extracted audio clip materialized as a waveform file.
///
/// The clip only describes the file; whoever created the file owns its
/// lifetime and deletes it.
#[derive(Clone, Debug, PartialEq)]
pub struct AudioClip {
    path: PathBuf,
    sample_rate: u32,
    channels: u16,
    duration_secs: f64,
}

impl AudioClip {
    pub fn new(path: &Path, sample_rate: u32, channels: u16, duration_secs: f64) -> Self {
        Self {
            path: path.to_path_buf(),
            sample_rate,
            channels,
            duration_secs,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn duration_secs(&self) -> f64 {
        self.duration_secs
    }
}
