use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::segmentation::domain::segment_window::SegmentWindow;
use crate::shared::time_span::TimeSpan;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::decode_error::DecodeError;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("no frames decoded between {start}s and {end}s")]
    NoFrames { start: u64, end: u64 },
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("GIF encoding failed: {0}")]
    Encode(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// One window of a source video, with the metadata needed to render it.
#[derive(Clone, Debug)]
pub struct VideoSegment {
    pub source: PathBuf,
    pub window: SegmentWindow,
    pub metadata: VideoMetadata,
}

impl VideoSegment {
    pub fn span(&self) -> TimeSpan {
        self.window.span()
    }
}

/// Renders a captioned animation for one video segment.
pub trait CaptionRenderer: Send {
    /// Writes the artifact to `output_path`, replacing any existing file, and
    /// returns its path. A failed call leaves no partial file behind.
    fn render(
        &self,
        segment: &VideoSegment,
        text: &str,
        output_path: &Path,
    ) -> Result<PathBuf, RenderError>;
}
