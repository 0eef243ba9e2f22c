use std::path::PathBuf;
use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use serde::Deserialize;
use tempfile::NamedTempFile;

use crate::audio::domain::audio_clip::AudioClip;
use crate::audio::domain::transcriber::{Transcriber, TranscriptionError};
use crate::audio::domain::transcript::Transcript;
use crate::audio::infrastructure::wav_file;
use crate::shared::constants::CANONICAL_SAMPLE_RATE;

/// Connection settings for an OpenAI-compatible transcription endpoint.
#[derive(Clone, Debug)]
pub struct HttpTranscriberConfig {
    pub url: String,
    pub model: String,
    pub api_key: Option<String>,
    pub language: Option<String>,
    pub timeout: Duration,
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Remote speech recognition over HTTP multipart upload.
pub struct HttpTranscriber {
    client: Client,
    config: HttpTranscriberConfig,
    scratch_dir: PathBuf,
}

impl HttpTranscriber {
    pub fn new(config: HttpTranscriberConfig) -> Result<Self, TranscriptionError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TranscriptionError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            config,
            scratch_dir: std::env::temp_dir(),
        })
    }

    #[cfg(test)]
    fn with_scratch_dir(mut self, dir: &std::path::Path) -> Self {
        self.scratch_dir = dir.to_path_buf();
        self
    }

    /// Canonical 16 kHz mono copy of the clip, deleted when dropped.
    fn canonical_wav(&self, clip: &AudioClip) -> Result<NamedTempFile, TranscriptionError> {
        let invalid = |e: &dyn std::fmt::Display| TranscriptionError::InvalidAudio(e.to_string());

        let audio = wav_file::read_wav(clip.path()).map_err(|e| invalid(&e))?;
        let audio = wav_file::to_mono(audio, CANONICAL_SAMPLE_RATE);

        let file = tempfile::Builder::new()
            .prefix("gifscribe-upload-")
            .suffix(".wav")
            .tempfile_in(&self.scratch_dir)
            .map_err(|e| invalid(&e))?;
        wav_file::write_wav(file.path(), &audio).map_err(|e| invalid(&e))?;
        Ok(file)
    }

    fn map_send_error(&self, e: reqwest::Error) -> TranscriptionError {
        if e.is_timeout() {
            TranscriptionError::Timeout(self.config.timeout)
        } else {
            TranscriptionError::Unavailable(e.to_string())
        }
    }
}

impl Transcriber for HttpTranscriber {
    fn transcribe(&self, clip: &AudioClip) -> Result<Transcript, TranscriptionError> {
        let wav = self.canonical_wav(clip)?;

        let part = Part::file(wav.path())
            .map_err(|e| TranscriptionError::InvalidAudio(e.to_string()))?
            .file_name("clip.wav")
            .mime_str("audio/wav")
            .map_err(|e| TranscriptionError::InvalidAudio(e.to_string()))?;

        let mut form = Form::new()
            .part("file", part)
            .text("model", self.config.model.clone())
            .text("response_format", "json");
        if let Some(language) = &self.config.language {
            form = form.text("language", language.clone());
        }

        let mut request = self.client.post(&self.config.url).multipart(form);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().map_err(|e| self.map_send_error(e))?;
        let status = response.status();
        let body = response.text().map_err(|e| self.map_send_error(e))?;

        if !status.is_success() {
            return Err(TranscriptionError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranscriptionResponse = serde_json::from_str(&body)
            .map_err(|e| TranscriptionError::InvalidResponse(format!("{e}: {body}")))?;
        Ok(Transcript::from_text(&parsed.text))
    }

    fn name(&self) -> &str {
        "http"
    }
}
