pub mod audio_clip;
pub mod audio_segment;
pub mod transcriber;
pub mod transcript;
