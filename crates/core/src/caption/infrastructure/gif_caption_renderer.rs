use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, RgbaImage};

use crate::caption::domain::caption_layout::{layout_caption, CaptionLayout};
use crate::caption::domain::caption_renderer::{CaptionRenderer, RenderError, VideoSegment};
use crate::caption::domain::caption_style::CaptionStyle;
use crate::shared::constants::DEFAULT_GIF_FPS;
use crate::shared::frame::Frame;
use crate::video::domain::clip_sampler::{ClipFrame, ClipSampler};
use crate::video::infrastructure::ffmpeg_clip_sampler::FfmpegClipSampler;

use super::bitmap_text::draw_caption;

/// Quantizer speed handed to the GIF encoder (1 = best, 30 = fastest).
const GIF_ENCODE_SPEED: i32 = 10;

/// Renders a looping GIF of one window with its caption burned in.
pub struct GifCaptionRenderer {
    sampler: Box<dyn ClipSampler>,
    style: CaptionStyle,
    fps: u32,
}

impl GifCaptionRenderer {
    pub fn new(sampler: Box<dyn ClipSampler>, style: CaptionStyle, fps: u32) -> Self {
        Self {
            sampler,
            style,
            fps: fps.max(1),
        }
    }

    pub fn with_ffmpeg(style: CaptionStyle, fps: u32) -> Self {
        Self::new(Box::new(FfmpegClipSampler), style, fps)
    }
}

impl Default for GifCaptionRenderer {
    fn default() -> Self {
        Self::with_ffmpeg(CaptionStyle::default(), DEFAULT_GIF_FPS)
    }
}

impl CaptionRenderer for GifCaptionRenderer {
    fn render(
        &self,
        segment: &VideoSegment,
        text: &str,
        output_path: &Path,
    ) -> Result<PathBuf, RenderError> {
        let dir = match output_path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::Builder::new()
            .prefix(".gifscribe-")
            .suffix(".gif.part")
            .tempfile_in(dir)?;

        let mut writer = BufWriter::new(tmp.as_file_mut());
        let mut encoder = GifEncoder::new_with_speed(&mut writer, GIF_ENCODE_SPEED);
        encoder.set_repeat(Repeat::Infinite).map_err(encode_error)?;

        // Frames are captioned and encoded as they are decoded; the layout
        // is fixed by the first frame's size.
        let mut layout: Option<Option<CaptionLayout>> = None;
        let mut failure: Option<RenderError> = None;
        let mut encode = |clip_frame: ClipFrame| {
            let mut frame = clip_frame.frame;
            let layout = layout.get_or_insert_with(|| {
                layout_caption(text, frame.width(), frame.height(), &self.style)
            });
            if let Some(layout) = layout {
                draw_caption(&mut frame, layout, &self.style);
            }
            let delay = Delay::from_numer_denom_ms(clip_frame.delay_ms, 1);
            let encoded = to_rgba(frame).and_then(|rgba| {
                encoder
                    .encode_frame(image::Frame::from_parts(rgba, 0, 0, delay))
                    .map_err(encode_error)
            });
            match encoded {
                Ok(()) => true,
                Err(err) => {
                    failure = Some(err);
                    false
                }
            }
        };

        let count = self
            .sampler
            .sample(&segment.source, segment.span(), self.fps, &mut encode)?;
        if let Some(err) = failure {
            return Err(err);
        }
        if count == 0 {
            return Err(RenderError::NoFrames {
                start: segment.window.start,
                end: segment.window.end,
            });
        }

        drop(encoder);
        writer.flush()?;
        drop(writer);

        tmp.persist(output_path).map_err(|e| RenderError::Io(e.error))?;
        log::debug!(
            "rendered {} ({count} frames) for window {}",
            output_path.display(),
            segment.window
        );
        Ok(output_path.to_path_buf())
    }
}

fn encode_error(err: image::ImageError) -> RenderError {
    RenderError::Encode(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segmentation::domain::segment_window::SegmentWindow;
    use crate::shared::time_span::TimeSpan;
    use crate::shared::video_metadata::VideoMetadata;
    use crate::video::domain::clip_sampler::PacedFrames;
    use crate::video::domain::decode_error::DecodeError;
    use image::codecs::gif::GifDecoder;
    use image::AnimationDecoder;
    use std::fs;
    use std::io::BufReader;
    use tempfile::TempDir;

    const BLUE: [u8; 3] = [0, 0, 200];

    /// Produces solid frames at a fixed source rate, paced like a real sampler.
    struct StubClipSampler {
        source_fps: f64,
        width: u32,
        height: u32,
    }

    impl ClipSampler for StubClipSampler {
        fn sample(
            &self,
            _path: &Path,
            span: TimeSpan,
            fps: u32,
            sink: &mut dyn FnMut(ClipFrame) -> bool,
        ) -> Result<usize, DecodeError> {
            let mut frames = PacedFrames::new(span, fps, sink);
            let mut i = 0;
            loop {
                let t = span.start + i as f64 / self.source_fps;
                if frames.is_done(t) {
                    break;
                }
                if let Some(slot) = frames.accept(t) {
                    frames.push(Frame::solid(self.width, self.height, BLUE, t), slot);
                }
                i += 1;
            }
            Ok(frames.finish())
        }
    }

    struct EmptyClipSampler;

    impl ClipSampler for EmptyClipSampler {
        fn sample(
            &self,
            _path: &Path,
            _span: TimeSpan,
            _fps: u32,
            _sink: &mut dyn FnMut(ClipFrame) -> bool,
        ) -> Result<usize, DecodeError> {
            Ok(0)
        }
    }

    struct FailingClipSampler;

    impl ClipSampler for FailingClipSampler {
        fn sample(
            &self,
            _path: &Path,
            _span: TimeSpan,
            _fps: u32,
            _sink: &mut dyn FnMut(ClipFrame) -> bool,
        ) -> Result<usize, DecodeError> {
            Err(DecodeError::Stream("bad packet".to_string()))
        }
    }

    fn segment(start: u64, end: u64) -> VideoSegment {
        VideoSegment {
            source: PathBuf::from("input.mp4"),
            window: SegmentWindow { index: 0, start, end },
            metadata: VideoMetadata {
                width: 160,
                height: 120,
                fps: 30.0,
                duration_secs: end as f64,
                codec: "mpeg4".to_string(),
                has_audio: true,
                source_path: Some(PathBuf::from("input.mp4")),
            },
        }
    }

    fn renderer(sampler: Box<dyn ClipSampler>) -> GifCaptionRenderer {
        GifCaptionRenderer::new(sampler, CaptionStyle::default(), 10)
    }

    fn stub() -> Box<dyn ClipSampler> {
        Box::new(StubClipSampler {
            source_fps: 30.0,
            width: 160,
            height: 120,
        })
    }

    fn decode(path: &Path) -> Vec<image::Frame> {
        let file = fs::File::open(path).unwrap();
        GifDecoder::new(BufReader::new(file))
            .unwrap()
            .into_frames()
            .collect_frames()
            .unwrap()
    }

    fn total_ms(frames: &[image::Frame]) -> u32 {
        frames
            .iter()
            .map(|f| {
                let (n, d) = f.delay().numer_denom_ms();
                n / d
            })
            .sum()
    }

    fn near(a: [u8; 4], b: [u8; 3]) -> bool {
        (0..3).all(|i| (a[i] as i32 - b[i] as i32).abs() < 40)
    }

    #[test]
    fn test_renders_gif_with_window_duration() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("fragment_a_0_2.gif");

        let path = renderer(stub()).render(&segment(0, 2), "hello", &out).unwrap();
        assert_eq!(path, out);

        let frames = decode(&out);
        assert_eq!(frames.len(), 20);
        assert_eq!(total_ms(&frames), 2000);
        assert_eq!(frames[0].buffer().dimensions(), (160, 120));
    }

    #[test]
    fn test_caption_box_is_drawn_at_bottom() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("captioned.gif");
        renderer(stub()).render(&segment(0, 1), "hello", &out).unwrap();

        let frames = decode(&out);
        let img = frames[0].buffer();
        assert!(near(img.get_pixel(80, 119).0, [255, 255, 255]));
        assert!(near(img.get_pixel(2, 2).0, BLUE));
        let has_red = img.pixels().any(|p| near(p.0, [255, 0, 0]));
        assert!(has_red, "caption text should be red");
    }

    #[test]
    fn test_blank_caption_draws_no_box() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("blank.gif");
        renderer(stub()).render(&segment(0, 1), "", &out).unwrap();

        let frames = decode(&out);
        assert!(near(frames[0].buffer().get_pixel(80, 119).0, BLUE));
    }

    #[test]
    fn test_existing_file_is_replaced() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("again.gif");
        fs::write(&out, b"stale").unwrap();

        renderer(stub()).render(&segment(0, 1), "fresh", &out).unwrap();
        let bytes = fs::read(&out).unwrap();
        assert_eq!(&bytes[..3], b"GIF");
    }

    #[test]
    fn test_no_frames_is_error_and_leaves_no_file() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("empty.gif");

        let result = renderer(Box::new(EmptyClipSampler)).render(&segment(5, 10), "x", &out);
        assert!(matches!(result, Err(RenderError::NoFrames { start: 5, end: 10 })));
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_decode_failure_is_reported() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("bad.gif");

        let result = renderer(Box::new(FailingClipSampler)).render(&segment(0, 1), "x", &out);
        assert!(matches!(result, Err(RenderError::Decode(_))));
        assert!(!out.exists());
    }

    #[test]
    fn test_missing_output_dir_is_io_error() {
        let result = renderer(stub()).render(
            &segment(0, 1),
            "x",
            Path::new("/nonexistent/dir/out.gif"),
        );
        assert!(matches!(result, Err(RenderError::Io(_))));
    }
}
