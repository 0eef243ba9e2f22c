use thiserror::Error;

use crate::audio::domain::transcriber::TranscriptionError;
use crate::caption::domain::caption_renderer::RenderError;
use crate::segmentation::domain::segment_window::SegmentWindow;
use crate::video::domain::decode_error::DecodeError;

use super::artifact::Artifact;

/// Why a single window could not be turned into an artifact.
#[derive(Error, Debug)]
pub enum WindowError {
    #[error("audio extraction failed: {0}")]
    Extraction(#[source] DecodeError),
    #[error("transcription failed: {0}")]
    Transcription(#[source] TranscriptionError),
    #[error("rendering failed: {0}")]
    Render(#[source] RenderError),
}

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("fragment duration must be greater than zero")]
    InvalidFragment,
    #[error("cannot read video: {0}")]
    Decode(#[from] DecodeError),
    #[error("window {window} failed: {source}")]
    Window {
        window: SegmentWindow,
        #[source]
        source: WindowError,
        completed: Vec<Artifact>,
    },
    #[error("cancelled after {} completed windows", .completed.len())]
    Cancelled { completed: Vec<Artifact> },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Artifacts finished before the run stopped.
    pub fn completed(&self) -> &[Artifact] {
        match self {
            PipelineError::Window { completed, .. } | PipelineError::Cancelled { completed } => {
                completed
            }
            _ => &[],
        }
    }
}
