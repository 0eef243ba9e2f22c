use std::path::Path;

use crate::audio::domain::audio_segment::AudioSegment;
use crate::shared::time_span::TimeSpan;
use crate::video::domain::audio_reader::AudioReader;
use crate::video::domain::decode_error::DecodeError;

use super::ffmpeg_support::{extract_f32_samples, open_input, seek_to, stream_origin, to_seconds};

/// Decodes audio from a video file using ffmpeg-next, resampled to mono f32.
pub struct FfmpegAudioReader;

impl AudioReader for FfmpegAudioReader {
    fn read_audio(
        &self,
        path: &Path,
        target_sample_rate: u32,
        span: Option<TimeSpan>,
    ) -> Result<Option<AudioSegment>, DecodeError> {
        let mut ictx = open_input(path)?;

        let audio_stream = match ictx.streams().best(ffmpeg_next::media::Type::Audio) {
            Some(stream) => stream,
            None => return Ok(None),
        };

        let audio_stream_index = audio_stream.index();
        let time_base = audio_stream.time_base();
        let origin = stream_origin(&audio_stream);
        let codec_params = audio_stream.parameters();

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(codec_params)
            .map_err(DecodeError::stream)?;
        let mut decoder = codec_ctx.decoder().audio().map_err(DecodeError::stream)?;

        let mut resampler = ffmpeg_next::software::resampling::Context::get(
            decoder.format(),
            decoder.channel_layout(),
            decoder.rate(),
            ffmpeg_next::format::Sample::F32(ffmpeg_next::format::sample::Type::Planar),
            ffmpeg_next::ChannelLayout::MONO,
            target_sample_rate,
        )
        .map_err(DecodeError::stream)?;

        if let Some(span) = span {
            seek_to(&mut ictx, span.start);
        }

        let mut all_samples: Vec<f32> = Vec::new();
        // Time of the first collected sample, from the first decoded frame's pts.
        let mut clock: Option<f64> = None;
        let mut decoded_frame = ffmpeg_next::util::frame::audio::Audio::empty();
        let mut resampled_frame = ffmpeg_next::util::frame::audio::Audio::empty();

        let mut collect = |decoded: &ffmpeg_next::util::frame::audio::Audio,
                           resampled: &mut ffmpeg_next::util::frame::audio::Audio,
                           clock: &mut Option<f64>,
                           out: &mut Vec<f32>|
         -> Result<bool, DecodeError> {
            let Some(span) = span else {
                resampler.run(decoded, resampled).map_err(DecodeError::stream)?;
                extract_f32_samples(resampled, out);
                return Ok(false);
            };

            let frame_time = decoded
                .timestamp()
                .or_else(|| decoded.pts())
                .map(|ts| to_seconds(ts, time_base, origin));
            if let (Some(time), Some(start)) = (frame_time, *clock) {
                let collected = out.len() as f64 / target_sample_rate as f64;
                if time >= span.end && start + collected >= span.end {
                    return Ok(true);
                }
            }
            if clock.is_none() {
                *clock = Some(frame_time.unwrap_or(0.0));
            }
            resampler.run(decoded, resampled).map_err(DecodeError::stream)?;
            extract_f32_samples(resampled, out);
            Ok(false)
        };

        let mut done = false;
        for (stream, packet) in ictx.packets() {
            if stream.index() != audio_stream_index {
                continue;
            }

            decoder.send_packet(&packet).map_err(DecodeError::stream)?;

            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                if collect(&decoded_frame, &mut resampled_frame, &mut clock, &mut all_samples)? {
                    done = true;
                    break;
                }
            }
            if done {
                break;
            }
        }

        if !done {
            // Flush the decoder
            decoder.send_eof().map_err(DecodeError::stream)?;
            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                if collect(&decoded_frame, &mut resampled_frame, &mut clock, &mut all_samples)? {
                    break;
                }
            }
        }
        drop(collect);

        // Flush the resampler (may have buffered samples)
        if let Ok(Some(delay)) = resampler.flush(&mut resampled_frame) {
            if delay.output > 0 {
                extract_f32_samples(&resampled_frame, &mut all_samples);
            }
        }

        let mut segment = AudioSegment::new(all_samples, target_sample_rate, 1);
        if let Some(span) = span {
            let first = clock.unwrap_or(span.start);
            segment.trim(span.start - first, span.end - first);
        }
        Ok(Some(segment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::infrastructure::test_media::{create_test_video, TestVideo};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_read_audio_nonexistent_file() {
        let reader = FfmpegAudioReader;
        let result = reader.read_audio(Path::new("/nonexistent/file.mp4"), 16000, None);
        assert!(matches!(result, Err(DecodeError::Open { .. })));
    }

    #[test]
    fn test_video_without_audio_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("silent.mp4");
        create_test_video(&path, &TestVideo::new(1.0));

        let result = FfmpegAudioReader.read_audio(&path, 16000, None).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_whole_track_is_mono_at_target_rate() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk.mp4");
        create_test_video(&path, &TestVideo::new(2.0).with_audio());

        let audio = FfmpegAudioReader
            .read_audio(&path, 8000, None)
            .unwrap()
            .unwrap();
        assert_eq!(audio.sample_rate(), 8000);
        assert_eq!(audio.channels(), 1);
        assert_abs_diff_eq!(audio.duration(), 2.0, epsilon = 0.15);
        assert!(audio.rms() > 0.1);
    }

    #[test]
    fn test_span_is_trimmed_to_its_duration() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk.mp4");
        create_test_video(&path, &TestVideo::new(3.0).with_audio());

        let audio = FfmpegAudioReader
            .read_audio(&path, 16000, Some(TimeSpan::new(1.0, 2.0)))
            .unwrap()
            .unwrap();
        assert_abs_diff_eq!(audio.duration(), 1.0, epsilon = 0.05);
    }

    #[test]
    fn test_last_span_is_clipped_at_track_end() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("talk.mp4");
        create_test_video(&path, &TestVideo::new(2.0).with_audio());

        let audio = FfmpegAudioReader
            .read_audio(&path, 16000, Some(TimeSpan::new(1.5, 5.0)))
            .unwrap()
            .unwrap();
        assert!(audio.duration() <= 0.7, "got {}", audio.duration());
        assert!(audio.duration() > 0.3, "got {}", audio.duration());
    }
}
