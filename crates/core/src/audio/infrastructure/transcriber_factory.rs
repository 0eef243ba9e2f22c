use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

use crate::audio::domain::transcriber::{Transcriber, TranscriptionError};
use crate::shared::constants::{WHISPER_MODEL_NAME, WHISPER_MODEL_URL};
use crate::shared::model_resolver::{self, ModelResolveError, ProgressFn};

use super::http_transcriber::{HttpTranscriber, HttpTranscriberConfig};
use super::whisper_transcriber::WhisperTranscriber;

/// Recognition backend preference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranscriberKind {
    Whisper,
    Http,
}

impl FromStr for TranscriberKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "whisper" => Ok(Self::Whisper),
            "http" => Ok(Self::Http),
            other => Err(format!("unknown transcriber '{other}' (expected whisper or http)")),
        }
    }
}

impl fmt::Display for TranscriberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Whisper => write!(f, "whisper"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Everything needed to build either backend.
#[derive(Clone, Debug)]
pub enum TranscriberSettings {
    Whisper {
        /// Explicit model file; resolved from the cache or downloaded when `None`.
        model_path: Option<PathBuf>,
        language: String,
    },
    Http(HttpTranscriberConfig),
}

impl TranscriberSettings {
    pub fn kind(&self) -> TranscriberKind {
        match self {
            Self::Whisper { .. } => TranscriberKind::Whisper,
            Self::Http(_) => TranscriberKind::Http,
        }
    }
}

#[derive(Error, Debug)]
pub enum TranscriberSetupError {
    #[error("cannot locate whisper model: {0}")]
    Model(#[from] ModelResolveError),
    #[error(transparent)]
    Backend(#[from] TranscriptionError),
}

/// Creates the configured transcriber. Logs which backend is selected.
pub fn create_transcriber(
    settings: TranscriberSettings,
    download_progress: Option<ProgressFn>,
) -> Result<Box<dyn Transcriber>, TranscriberSetupError> {
    match settings {
        TranscriberSettings::Whisper {
            model_path,
            language,
        } => {
            let model_path = match model_path {
                Some(path) => path,
                None => model_resolver::resolve(
                    WHISPER_MODEL_NAME,
                    WHISPER_MODEL_URL,
                    None,
                    download_progress,
                )?,
            };
            log::info!(
                "Using local whisper transcriber (model={}, language={language})",
                model_path.display()
            );
            Ok(Box::new(WhisperTranscriber::new(&model_path, &language)?))
        }
        TranscriberSettings::Http(config) => {
            log::info!(
                "Using HTTP transcriber at {} (model={}, timeout={:?})",
                config.url,
                config.model,
                config.timeout
            );
            Ok(Box::new(HttpTranscriber::new(config)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::time::Duration;

    #[rstest]
    #[case("whisper", TranscriberKind::Whisper)]
    #[case("HTTP", TranscriberKind::Http)]
    #[case(" http ", TranscriberKind::Http)]
    fn test_parse_kind(#[case] input: &str, #[case] expected: TranscriberKind) {
        assert_eq!(input.parse::<TranscriberKind>().unwrap(), expected);
    }

    #[test]
    fn test_parse_unknown_kind_fails() {
        let err = "vosk".parse::<TranscriberKind>().unwrap_err();
        assert!(err.contains("vosk"));
    }

    #[test]
    fn test_kind_display_round_trips() {
        for kind in [TranscriberKind::Whisper, TranscriberKind::Http] {
            assert_eq!(kind.to_string().parse::<TranscriberKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_create_http_transcriber() {
        let settings = TranscriberSettings::Http(HttpTranscriberConfig {
            url: "http://127.0.0.1:9/v1/audio/transcriptions".to_string(),
            model: "whisper-1".to_string(),
            api_key: None,
            language: None,
            timeout: Duration::from_secs(1),
        });
        assert_eq!(settings.kind(), TranscriberKind::Http);
        let transcriber = create_transcriber(settings, None).unwrap();
        assert_eq!(transcriber.name(), "http");
    }

    #[test]
    fn test_create_whisper_with_missing_model_fails() {
        let settings = TranscriberSettings::Whisper {
            model_path: Some(PathBuf::from("/nonexistent/ggml.bin")),
            language: "en".to_string(),
        };
        let result = create_transcriber(settings, None);
        assert!(matches!(
            result,
            Err(TranscriberSetupError::Backend(TranscriptionError::Model(_)))
        ));
    }
}
