pub mod audio_extractor;
pub mod audio_reader;
pub mod clip_sampler;
pub mod decode_error;
pub mod video_probe;
