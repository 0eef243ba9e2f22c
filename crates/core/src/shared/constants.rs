/// Default window length for segmentation, in seconds.
pub const DEFAULT_FRAGMENT_SECONDS: u64 = 5;

/// Default frame rate of the rendered GIFs.
pub const DEFAULT_GIF_FPS: u32 = 10;

/// Sample rate used for extracted clips and recognizer input.
pub const CANONICAL_SAMPLE_RATE: u32 = 16000;

pub const WHISPER_MODEL_NAME: &str = "ggml-tiny.en.bin";
pub const WHISPER_MODEL_URL: &str =
    "https://huggingface.co/ggerganov/whisper.cpp/resolve/main/ggml-tiny.en.bin";

/// Request timeout for remote transcription services, in seconds.
pub const DEFAULT_TRANSCRIBE_TIMEOUT_SECS: u64 = 30;

pub const ARTIFACT_EXTENSION: &str = "gif";
