use std::time::Duration;

use thiserror::Error;

use super::audio_clip::AudioClip;
use super::transcript::Transcript;

#[derive(Error, Debug)]
pub enum TranscriptionError {
    #[error("recognition service timed out after {0:?}")]
    Timeout(Duration),
    #[error("recognition service unavailable: {0}")]
    Unavailable(String),
    #[error("recognition service rejected the request (HTTP {status}): {body}")]
    Rejected { status: u16, body: String },
    #[error("unexpected response from recognition service: {0}")]
    InvalidResponse(String),
    #[error("cannot prepare audio for recognition: {0}")]
    InvalidAudio(String),
    #[error("speech model error: {0}")]
    Model(String),
}

/// Domain interface for speech-to-text.
///
/// Implementations canonicalize the clip to the format their backend
/// expects, run recognition, and report silence as
/// [`Transcript::NoSpeech`] rather than as an error.
pub trait Transcriber: Send {
    fn transcribe(&self, clip: &AudioClip) -> Result<Transcript, TranscriptionError>;

    fn name(&self) -> &str;
}
