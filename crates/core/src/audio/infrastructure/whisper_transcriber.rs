use std::path::Path;

use whisper_rs::{FullParams, SamplingStrategy, WhisperContext, WhisperContextParameters};

use crate::audio::domain::audio_clip::AudioClip;
use crate::audio::domain::transcriber::{Transcriber, TranscriptionError};
use crate::audio::domain::transcript::Transcript;
use crate::audio::infrastructure::wav_file;
use crate::shared::constants::CANONICAL_SAMPLE_RATE;

/// Local speech recognition through whisper.cpp via whisper-rs.
///
/// The model is loaded once; each call creates a fresh decoding state.
pub struct WhisperTranscriber {
    context: WhisperContext,
    language: String,
}

impl WhisperTranscriber {
    pub fn new(model_path: &Path, language: &str) -> Result<Self, TranscriptionError> {
        if !model_path.exists() {
            return Err(TranscriptionError::Model(format!(
                "Whisper model not found at: {}",
                model_path.display()
            )));
        }
        let path_str = model_path
            .to_str()
            .ok_or_else(|| TranscriptionError::Model("Invalid model path".to_string()))?;
        let context = WhisperContext::new_with_params(path_str, WhisperContextParameters::default())
            .map_err(|e| TranscriptionError::Model(format!("Failed to load Whisper model: {e}")))?;

        Ok(Self {
            context,
            language: language.to_string(),
        })
    }
}

impl Transcriber for WhisperTranscriber {
    fn transcribe(&self, clip: &AudioClip) -> Result<Transcript, TranscriptionError> {
        let audio = wav_file::read_wav(clip.path())
            .map_err(|e| TranscriptionError::InvalidAudio(e.to_string()))?;
        let audio = wav_file::to_mono(audio, CANONICAL_SAMPLE_RATE);
        if audio.samples().is_empty() {
            return Ok(Transcript::NoSpeech);
        }

        let mut state = self
            .context
            .create_state()
            .map_err(|e| TranscriptionError::Model(format!("Failed to create Whisper state: {e}")))?;

        let mut params = FullParams::new(SamplingStrategy::Greedy { best_of: 0 });
        params.set_language(Some(&self.language));
        params.set_translate(false);
        params.set_print_special(false);
        params.set_print_progress(false);
        params.set_print_realtime(false);
        params.set_print_timestamps(false);
        params.set_suppress_blank(true);
        params.set_n_threads(num_cpus().min(4) as i32);

        state
            .full(params, audio.samples())
            .map_err(|e| TranscriptionError::Model(format!("Whisper inference failed: {e}")))?;

        let mut text = String::new();
        for seg_idx in 0..state.full_n_segments() {
            let Some(segment) = state.get_segment(seg_idx) else {
                continue;
            };
            for tok_idx in 0..segment.n_tokens() {
                let Some(token) = segment.get_token(tok_idx) else {
                    continue;
                };
                let Ok(piece) = token.to_str() else {
                    continue;
                };
                // Special tokens look like [_BEG_], [_SOT_], <|endoftext|>
                let trimmed = piece.trim();
                if trimmed.starts_with('[') || trimmed.starts_with('<') {
                    continue;
                }
                text.push_str(piece);
            }
            text.push(' ');
        }

        log::debug!("whisper: {} chars for {}", text.trim().len(), clip.path().display());
        Ok(Transcript::from_text(&text))
    }

    fn name(&self) -> &str {
        "whisper"
    }
}

fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::domain::audio_segment::AudioSegment;
    use tempfile::TempDir;

    #[test]
    fn test_new_nonexistent_path_returns_model_error() {
        let result = WhisperTranscriber::new(Path::new("/nonexistent/model.bin"), "en");
        match result {
            Err(TranscriptionError::Model(msg)) => assert!(
                msg.contains("not found"),
                "Expected 'not found' in error, got: {msg}"
            ),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected an error"),
        }
    }

    #[test]
    #[ignore] // Requires whisper model file
    fn test_transcribe_silence_is_no_speech() {
        let model_path = crate::shared::model_resolver::resolve(
            crate::shared::constants::WHISPER_MODEL_NAME,
            crate::shared::constants::WHISPER_MODEL_URL,
            None,
            None,
        )
        .expect("Failed to resolve whisper model");
        let transcriber = WhisperTranscriber::new(&model_path, "en").unwrap();

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("silence.wav");
        wav_file::write_wav(&path, &AudioSegment::new(vec![0.0; 32000], 16000, 1)).unwrap();
        let clip = AudioClip::new(&path, 16000, 1, 2.0);

        let result = transcriber.transcribe(&clip);
        assert!(result.is_ok(), "Transcription should not error: {result:?}");
    }
}
