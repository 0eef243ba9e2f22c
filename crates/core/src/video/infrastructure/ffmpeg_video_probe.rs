use std::path::Path;

use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::decode_error::DecodeError;
use crate::video::domain::video_probe::VideoProbe;

use super::ffmpeg_support::{open_input, MICROS_PER_SECOND};

/// Reads container metadata via ffmpeg-next without decoding any frames.
pub struct FfmpegVideoProbe;

impl VideoProbe for FfmpegVideoProbe {
    fn probe(&self, path: &Path) -> Result<VideoMetadata, DecodeError> {
        let ictx = open_input(path)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| DecodeError::NoVideoStream(path.to_path_buf()))?;

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .map_err(DecodeError::stream)?;
        let decoder = codec_ctx.decoder().video().map_err(DecodeError::stream)?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let duration_secs = if ictx.duration() > 0 {
            ictx.duration() as f64 / MICROS_PER_SECOND
        } else {
            let tb = stream.time_base();
            if stream.duration() > 0 && tb.denominator() != 0 {
                stream.duration() as f64 * tb.numerator() as f64 / tb.denominator() as f64
            } else {
                0.0
            }
        };

        let has_audio = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Audio)
            .is_some();

        Ok(VideoMetadata {
            width: decoder.width(),
            height: decoder.height(),
            fps,
            duration_secs,
            codec: decoder
                .codec()
                .map(|c| c.name().to_string())
                .unwrap_or_default(),
            has_audio,
            source_path: Some(path.to_path_buf()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::infrastructure::test_media::{create_test_video, TestVideo};
    use approx::assert_abs_diff_eq;
    use std::fs;

    #[test]
    fn test_probe_reports_size_duration_and_audio() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk.mp4");
        create_test_video(&path, &TestVideo::new(3.0).with_audio());

        let meta = FfmpegVideoProbe.probe(&path).unwrap();
        assert_eq!(meta.width, 160);
        assert_eq!(meta.height, 120);
        assert!(meta.fps > 0.0);
        assert_abs_diff_eq!(meta.duration_secs, 3.0, epsilon = 0.15);
        assert!(meta.has_audio);
        assert_eq!(meta.source_path, Some(path));
    }

    #[test]
    fn test_probe_silent_video_has_no_audio() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silent.mp4");
        create_test_video(&path, &TestVideo::new(1.0));

        let meta = FfmpegVideoProbe.probe(&path).unwrap();
        assert!(!meta.has_audio);
    }

    #[test]
    fn test_probe_nonexistent_file_fails() {
        let result = FfmpegVideoProbe.probe(Path::new("/nonexistent/test.mp4"));
        assert!(matches!(result, Err(DecodeError::Open { .. })));
    }

    #[test]
    fn test_probe_garbage_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("corrupt.mp4");
        fs::write(&path, b"this is not a video container at all").unwrap();
        assert!(FfmpegVideoProbe.probe(&path).is_err());
    }
}
