use std::path::Path;

use crate::shared::frame::Frame;
use crate::shared::time_span::TimeSpan;
use crate::video::domain::clip_sampler::{ClipFrame, ClipSampler, PacedFrames};
use crate::video::domain::decode_error::DecodeError;

use super::ffmpeg_support::{extract_rgb_pixels, open_input, seek_to, stream_origin, to_seconds};

/// Decodes one window of a video via ffmpeg-next, converting the kept frames
/// to RGB24.
///
/// Seeks to the keyframe before the span start and decodes forward until the
/// first frame past the span end. Only the frame awaiting its delay is held.
pub struct FfmpegClipSampler;

impl ClipSampler for FfmpegClipSampler {
    fn sample(
        &self,
        path: &Path,
        span: TimeSpan,
        fps: u32,
        sink: &mut dyn FnMut(ClipFrame) -> bool,
    ) -> Result<usize, DecodeError> {
        let mut ictx = open_input(path)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or_else(|| DecodeError::NoVideoStream(path.to_path_buf()))?;
        let stream_index = stream.index();
        let time_base = stream.time_base();
        let origin = stream_origin(&stream);

        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())
            .map_err(DecodeError::stream)?;
        let mut decoder = codec_ctx.decoder().video().map_err(DecodeError::stream)?;

        let width = decoder.width();
        let height = decoder.height();
        let mut scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .map_err(DecodeError::stream)?;

        seek_to(&mut ictx, span.start);

        let mut frames = PacedFrames::new(span, fps, sink);
        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();

        // Returns true once decoding can stop.
        let mut keep = |decoded: &ffmpeg_next::util::frame::video::Video,
                        rgb_frame: &mut ffmpeg_next::util::frame::video::Video,
                        frames: &mut PacedFrames<'_>|
         -> Result<bool, DecodeError> {
            let Some(ts) = decoded.timestamp().or_else(|| decoded.pts()) else {
                return Ok(false);
            };
            let time = to_seconds(ts, time_base, origin);
            if frames.is_done(time) {
                return Ok(true);
            }
            if let Some(slot) = frames.accept(time) {
                scaler.run(decoded, rgb_frame).map_err(DecodeError::stream)?;
                let pixels = extract_rgb_pixels(rgb_frame, width, height);
                frames.push(Frame::new(pixels, width, height, time), slot);
            }
            Ok(frames.is_stopped())
        };

        let mut done = false;
        for (stream, packet) in ictx.packets() {
            if stream.index() != stream_index {
                continue;
            }
            decoder.send_packet(&packet).map_err(DecodeError::stream)?;
            while decoder.receive_frame(&mut decoded).is_ok() {
                if keep(&decoded, &mut rgb_frame, &mut frames)? {
                    done = true;
                    break;
                }
            }
            if done {
                break;
            }
        }

        if !done {
            decoder.send_eof().map_err(DecodeError::stream)?;
            while decoder.receive_frame(&mut decoded).is_ok() {
                if keep(&decoded, &mut rgb_frame, &mut frames)? {
                    break;
                }
            }
        }

        let total_slots = frames.pacer().total_slots();
        let delivered = frames.finish();
        log::debug!(
            "sampled {} of {} slots from {} in [{:.2}, {:.2})",
            delivered,
            total_slots,
            path.display(),
            span.start,
            span.end
        );
        Ok(delivered)
    }
}
