use std::path::Path;

use super::decode_error::DecodeError;
use crate::audio::domain::audio_segment::AudioSegment;
use crate::shared::time_span::TimeSpan;

/// Domain interface for decoding audio from a media file.
pub trait AudioReader: Send {
    /// Decode the audio track to a mono PCM AudioSegment at the given sample
    /// rate, restricted to `span` when one is given.
    /// Returns None if the file has no audio track.
    fn read_audio(
        &self,
        path: &Path,
        target_sample_rate: u32,
        span: Option<TimeSpan>,
    ) -> Result<Option<AudioSegment>, DecodeError>;
}
