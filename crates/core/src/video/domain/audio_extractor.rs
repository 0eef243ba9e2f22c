use std::path::Path;

use super::decode_error::DecodeError;
use crate::audio::domain::audio_clip::AudioClip;
use crate::shared::time_span::TimeSpan;

/// Writes the audio of a video (or of one span of it) to a waveform file
/// the transcribers can consume.
pub trait AudioExtractor: Send {
    /// Returns `Ok(None)` and writes nothing when the video has no audio track.
    fn extract(
        &self,
        video_path: &Path,
        span: Option<TimeSpan>,
        audio_out_path: &Path,
    ) -> Result<Option<AudioClip>, DecodeError>;
}
