use std::path::Path;

use super::decode_error::DecodeError;
use crate::shared::video_metadata::VideoMetadata;

/// Opens a video container and reports its metadata without decoding frames.
pub trait VideoProbe: Send {
    fn probe(&self, path: &Path) -> Result<VideoMetadata, DecodeError>;
}
