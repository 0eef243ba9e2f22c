//! Small helpers shared by the ffmpeg-backed adapters.

use std::path::Path;

use ffmpeg_next::format::context::Input;
use ffmpeg_next::Rational;

use crate::video::domain::decode_error::DecodeError;

pub(crate) const MICROS_PER_SECOND: f64 = 1_000_000.0;

// AV_NOPTS_VALUE
const NO_PTS: i64 = i64::MIN;

/// Opens a container, mapping failures to [`DecodeError::Open`].
pub(crate) fn open_input(path: &Path) -> Result<Input, DecodeError> {
    ffmpeg_next::init().map_err(DecodeError::stream)?;
    ffmpeg_next::format::input(path).map_err(|e| DecodeError::Open {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Seeks to the nearest keyframe at or before `seconds`.
///
/// A failed seek leaves the input at its current position; callers filter
/// decoded frames by timestamp, so that only costs decode time.
pub(crate) fn seek_to(ictx: &mut Input, seconds: f64) {
    if seconds <= 0.0 {
        return;
    }
    let ts = (seconds * MICROS_PER_SECOND) as i64;
    if let Err(e) = ictx.seek(ts, ..ts) {
        log::debug!("seek to {seconds:.3}s failed ({e}), decoding from current position");
    }
}

/// Converts a stream timestamp to seconds from the stream origin.
pub(crate) fn to_seconds(ts: i64, time_base: Rational, origin: i64) -> f64 {
    let den = time_base.denominator();
    if den == 0 {
        return 0.0;
    }
    (ts - origin) as f64 * time_base.numerator() as f64 / den as f64
}

/// A stream's start time, or 0 when the container does not report one.
pub(crate) fn stream_origin(stream: &ffmpeg_next::format::stream::Stream) -> i64 {
    match stream.start_time() {
        NO_PTS => 0,
        ts => ts,
    }
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer.
///
/// ffmpeg frames may have padding bytes at the end of each row (stride > width*3).
pub(crate) fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}

/// Extract f32 samples from a planar mono resampled frame.
pub(crate) fn extract_f32_samples(frame: &ffmpeg_next::util::frame::audio::Audio, out: &mut Vec<f32>) {
    let num_samples = frame.samples();
    if num_samples == 0 {
        return;
    }
    let data = frame.data(0);
    let floats = unsafe { std::slice::from_raw_parts(data.as_ptr() as *const f32, num_samples) };
    out.extend_from_slice(floats);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_to_seconds() {
        assert_relative_eq!(to_seconds(90_000, Rational(1, 90_000), 0), 1.0);
        assert_relative_eq!(to_seconds(30, Rational(1, 30), 15), 0.5);
        assert_relative_eq!(to_seconds(100, Rational(1, 0), 0), 0.0);
    }

    #[test]
    fn test_open_nonexistent_is_open_error() {
        let result = open_input(Path::new("/nonexistent/file.mp4"));
        assert!(matches!(result, Err(DecodeError::Open { .. })));
    }
}
