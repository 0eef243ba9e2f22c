use std::path::PathBuf;

use thiserror::Error;

/// Failures while reading media: unreadable or corrupt containers, missing
/// streams, and failures writing decoded audio back out.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("cannot open {}: {reason}", .path.display())]
    Open { path: PathBuf, reason: String },
    #[error("no video stream in {}", .0.display())]
    NoVideoStream(PathBuf),
    #[error("decode failed: {0}")]
    Stream(String),
    #[error("failed to write audio to {}: {reason}", .path.display())]
    AudioWrite { path: PathBuf, reason: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    pub fn stream(err: impl std::fmt::Display) -> Self {
        DecodeError::Stream(err.to_string())
    }
}
