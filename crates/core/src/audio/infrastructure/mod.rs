pub mod http_transcriber;
pub mod transcriber_factory;
pub mod wav_file;
pub mod whisper_transcriber;
