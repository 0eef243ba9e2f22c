pub mod ffmpeg_audio_reader;
pub mod ffmpeg_clip_sampler;
mod ffmpeg_support;
pub mod ffmpeg_video_probe;
pub mod wav_audio_extractor;

#[cfg(any(test, feature = "test-media"))]
pub mod test_media;
