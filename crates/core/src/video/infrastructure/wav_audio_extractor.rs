use std::path::Path;

use crate::audio::domain::audio_clip::AudioClip;
use crate::audio::infrastructure::wav_file;
use crate::shared::constants::CANONICAL_SAMPLE_RATE;
use crate::shared::time_span::TimeSpan;
use crate::video::domain::audio_extractor::AudioExtractor;
use crate::video::domain::audio_reader::AudioReader;
use crate::video::domain::decode_error::DecodeError;

/// Extracts audio through an [`AudioReader`] and writes it as 16-bit PCM WAV.
pub struct WavAudioExtractor {
    reader: Box<dyn AudioReader>,
    sample_rate: u32,
}

impl WavAudioExtractor {
    pub fn new(reader: Box<dyn AudioReader>, sample_rate: u32) -> Self {
        Self {
            reader,
            sample_rate,
        }
    }

    pub fn with_ffmpeg() -> Self {
        Self::new(
            Box::new(super::ffmpeg_audio_reader::FfmpegAudioReader),
            CANONICAL_SAMPLE_RATE,
        )
    }
}

impl AudioExtractor for WavAudioExtractor {
    fn extract(
        &self,
        video_path: &Path,
        span: Option<TimeSpan>,
        audio_out_path: &Path,
    ) -> Result<Option<AudioClip>, DecodeError> {
        let Some(segment) = self.reader.read_audio(video_path, self.sample_rate, span)? else {
            log::debug!("{} has no audio track", video_path.display());
            return Ok(None);
        };

        wav_file::write_wav(audio_out_path, &segment).map_err(|e| DecodeError::AudioWrite {
            path: audio_out_path.to_path_buf(),
            reason: e.to_string(),
        })?;

        Ok(Some(AudioClip::new(
            audio_out_path,
            segment.sample_rate(),
            segment.channels(),
            segment.duration(),
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::domain::audio_segment::AudioSegment;
    use std::sync::{Arc, Mutex};

    struct StubAudioReader {
        segment: Option<AudioSegment>,
        requests: Arc<Mutex<Vec<(u32, Option<TimeSpan>)>>>,
    }

    impl AudioReader for StubAudioReader {
        fn read_audio(
            &self,
            _path: &Path,
            target_sample_rate: u32,
            span: Option<TimeSpan>,
        ) -> Result<Option<AudioSegment>, DecodeError> {
            self.requests.lock().unwrap().push((target_sample_rate, span));
            Ok(self.segment.clone())
        }
    }

    struct FailingAudioReader;

    impl AudioReader for FailingAudioReader {
        fn read_audio(
            &self,
            _path: &Path,
            _target_sample_rate: u32,
            _span: Option<TimeSpan>,
        ) -> Result<Option<AudioSegment>, DecodeError> {
            Err(DecodeError::Stream("corrupt packet".to_string()))
        }
    }

    #[test]
    fn test_extract_writes_wav_and_describes_clip() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("window.wav");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let extractor = WavAudioExtractor::new(
            Box::new(StubAudioReader {
                segment: Some(AudioSegment::new(vec![0.25; 8000], 16000, 1)),
                requests: requests.clone(),
            }),
            16000,
        );

        let span = TimeSpan::new(5.0, 10.0);
        let clip = extractor
            .extract(Path::new("video.mp4"), Some(span), &out)
            .unwrap()
            .unwrap();

        assert_eq!(clip.path(), out.as_path());
        assert_eq!(clip.sample_rate(), 16000);
        assert_eq!(clip.channels(), 1);
        assert_eq!(clip.duration_secs(), 0.5);
        assert!(out.exists());
        assert_eq!(wav_file::read_wav(&out).unwrap().samples().len(), 8000);
        assert_eq!(*requests.lock().unwrap(), vec![(16000, Some(span))]);
    }

    #[test]
    fn test_no_audio_track_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("window.wav");
        let extractor = WavAudioExtractor::new(
            Box::new(StubAudioReader {
                segment: None,
                requests: Arc::new(Mutex::new(Vec::new())),
            }),
            16000,
        );

        let clip = extractor.extract(Path::new("video.mp4"), None, &out).unwrap();
        assert!(clip.is_none());
        assert!(!out.exists());
    }

    #[test]
    fn test_decode_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("window.wav");
        let extractor = WavAudioExtractor::new(Box::new(FailingAudioReader), 16000);

        let result = extractor.extract(Path::new("video.mp4"), None, &out);
        assert!(matches!(result, Err(DecodeError::Stream(_))));
        assert!(!out.exists());
    }

    #[test]
    fn test_unwritable_destination_is_audio_write_error() {
        let extractor = WavAudioExtractor::new(
            Box::new(StubAudioReader {
                segment: Some(AudioSegment::new(vec![0.0; 10], 16000, 1)),
                requests: Arc::new(Mutex::new(Vec::new())),
            }),
            16000,
        );
        let result = extractor.extract(
            Path::new("video.mp4"),
            None,
            Path::new("/nonexistent/dir/out.wav"),
        );
        assert!(matches!(result, Err(DecodeError::AudioWrite { .. })));
    }

    #[test]
    fn test_with_ffmpeg_extracts_real_track() {
        use crate::video::infrastructure::test_media::{create_test_video, TestVideo};

        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("talk.mp4");
        create_test_video(&video, &TestVideo::new(2.0).with_audio());
        let out = dir.path().join("full.wav");

        let clip = WavAudioExtractor::with_ffmpeg()
            .extract(&video, None, &out)
            .unwrap()
            .unwrap();
        assert_eq!(clip.sample_rate(), CANONICAL_SAMPLE_RATE);
        assert!(clip.duration_secs() > 1.8);
    }
}
