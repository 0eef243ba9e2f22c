use crate::audio::domain::transcriber::Transcriber;
use crate::caption::domain::caption_style::CaptionStyle;
use crate::caption::infrastructure::gif_caption_renderer::GifCaptionRenderer;
use crate::video::infrastructure::ffmpeg_video_probe::FfmpegVideoProbe;
use crate::video::infrastructure::wav_audio_extractor::WavAudioExtractor;

use super::caption_video_use_case::CaptionVideoUseCase;
use super::pipeline_config::PipelineConfig;

/// Wires the ffmpeg probe, WAV extractor and GIF renderer around
/// `transcriber`.
pub fn create_pipeline(
    transcriber: Box<dyn Transcriber>,
    style: CaptionStyle,
    gif_fps: u32,
    config: PipelineConfig,
) -> CaptionVideoUseCase {
    log::debug!(
        "pipeline: fragment={}s, fps={gif_fps}, policy={}, font={}px",
        config.fragment_seconds,
        config.failure_policy,
        style.font_px
    );
    CaptionVideoUseCase::new(
        Box::new(FfmpegVideoProbe),
        Box::new(WavAudioExtractor::with_ffmpeg()),
        transcriber,
        Box::new(GifCaptionRenderer::with_ffmpeg(style, gif_fps)),
        config,
    )
}
