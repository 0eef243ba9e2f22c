use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};

use gifscribe_core::audio::infrastructure::http_transcriber::HttpTranscriberConfig;
use gifscribe_core::audio::infrastructure::transcriber_factory::{
    create_transcriber, TranscriberSettings,
};
use gifscribe_core::audio::infrastructure::wav_file;
use gifscribe_core::caption::domain::caption_style::CaptionStyle;
use gifscribe_core::pipeline::artifact::sanitize_stem;
use gifscribe_core::pipeline::pipeline_config::{FailurePolicy, PipelineConfig};
use gifscribe_core::pipeline::pipeline_factory::create_pipeline;
use gifscribe_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use gifscribe_core::pipeline::progress::ProgressEvent;
use gifscribe_core::shared::constants::{
    CANONICAL_SAMPLE_RATE, DEFAULT_FRAGMENT_SECONDS, DEFAULT_GIF_FPS,
    DEFAULT_TRANSCRIBE_TIMEOUT_SECS,
};
use gifscribe_core::video::domain::audio_reader::AudioReader;
use gifscribe_core::video::infrastructure::ffmpeg_audio_reader::FfmpegAudioReader;

/// Turn a video into captioned GIF fragments.
#[derive(Parser)]
#[command(name = "gifscribe", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Split a video into windows and render one captioned GIF per window.
    Process(ProcessArgs),
    /// Extract the whole audio track of a video to a WAV file.
    ExtractAudio(ExtractAudioArgs),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Backend {
    Whisper,
    Http,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OnError {
    Continue,
    Abort,
}

#[derive(Args)]
struct ProcessArgs {
    /// Input video file.
    video: PathBuf,

    /// Directory the GIFs are written to.
    #[arg(long, default_value = "output")]
    output_dir: PathBuf,

    /// Window length in seconds.
    #[arg(long, default_value_t = DEFAULT_FRAGMENT_SECONDS)]
    fragment: u64,

    /// GIF frame rate.
    #[arg(long, default_value_t = DEFAULT_GIF_FPS)]
    fps: u32,

    /// Speech recognition backend.
    #[arg(long, value_enum, default_value = "whisper")]
    transcriber: Backend,

    /// Whisper model file (downloaded to the cache when omitted).
    #[arg(long)]
    whisper_model: Option<PathBuf>,

    /// Transcription endpoint for the http backend.
    #[arg(long)]
    http_url: Option<String>,

    /// Model name sent to the http backend.
    #[arg(long, default_value = "whisper-1")]
    http_model: String,

    /// Bearer token for the http backend.
    #[arg(long, env = "TRANSCRIBE_API_KEY", hide_env_values = true)]
    http_api_key: Option<String>,

    /// Spoken language hint.
    #[arg(long, default_value = "en")]
    language: String,

    /// Request timeout for the http backend, in seconds.
    #[arg(long, default_value_t = DEFAULT_TRANSCRIBE_TIMEOUT_SECS)]
    timeout: u64,

    /// What to do when a window fails.
    #[arg(long, value_enum, default_value = "continue")]
    on_error: OnError,

    /// Caption glyph height in pixels.
    #[arg(long, default_value = "48")]
    font_size: u32,

    /// Maximum caption lines per GIF.
    #[arg(long, default_value = "3")]
    max_lines: usize,
}

#[derive(Args)]
struct ExtractAudioArgs {
    /// Input video file.
    video: PathBuf,

    /// Output WAV file.
    output: PathBuf,

    /// Output sample rate in Hz.
    #[arg(long, default_value_t = CANONICAL_SAMPLE_RATE)]
    sample_rate: u32,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    match cli.command {
        Command::Process(args) => {
            validate_process(&args)?;
            run_process(args)
        }
        Command::ExtractAudio(args) => {
            validate_extract(&args)?;
            run_extract_audio(&args)
        }
    }
}

fn run_process(args: ProcessArgs) -> Result<(), Box<dyn std::error::Error>> {
    let settings = transcriber_settings(&args);
    log::info!("Preparing {} transcriber", settings.kind());
    let transcriber = create_transcriber(settings, Some(Box::new(download_progress)))?;

    let style = CaptionStyle {
        font_px: args.font_size,
        max_lines: args.max_lines,
        ..CaptionStyle::default()
    };
    let config = PipelineConfig {
        fragment_seconds: args.fragment,
        failure_policy: match args.on_error {
            OnError::Continue => FailurePolicy::Continue,
            OnError::Abort => FailurePolicy::Abort,
        },
        artifact_stem: artifact_stem(&args.video),
    };

    let progress = Box::new(|event: &ProgressEvent| {
        eprint!(
            "\rWindow {}/{} {:?} ({:.0}%)   ",
            event.window_index + 1,
            event.total_windows,
            event.phase,
            event.fraction() * 100.0
        );
        true
    });

    let mut pipeline = create_pipeline(transcriber, style, args.fps, config)
        .with_progress(progress)
        .with_logger(Box::new(StdoutPipelineLogger::default()));

    let result = pipeline.process(&args.video, &args.output_dir);
    eprintln!();
    let report = result?;

    for artifact in &report.artifacts {
        println!("{}", artifact.path.display());
    }
    for failure in &report.failures {
        eprintln!("Window {} failed: {}", failure.window, failure.error);
    }
    log::info!(
        "Wrote {} GIF(s) to {}",
        report.artifacts.len(),
        args.output_dir.display()
    );
    Ok(())
}

fn run_extract_audio(args: &ExtractAudioArgs) -> Result<(), Box<dyn std::error::Error>> {
    let audio = FfmpegAudioReader
        .read_audio(&args.video, args.sample_rate, None)?
        .ok_or_else(|| format!("{} has no audio track", args.video.display()))?;
    wav_file::write_wav(&args.output, &audio)?;
    log::info!(
        "Wrote {:.1}s of audio to {}",
        audio.duration(),
        args.output.display()
    );
    Ok(())
}

fn transcriber_settings(args: &ProcessArgs) -> TranscriberSettings {
    match args.transcriber {
        Backend::Whisper => TranscriberSettings::Whisper {
            model_path: args.whisper_model.clone(),
            language: args.language.clone(),
        },
        Backend::Http => TranscriberSettings::Http(HttpTranscriberConfig {
            url: args.http_url.clone().unwrap_or_default(),
            model: args.http_model.clone(),
            api_key: args.http_api_key.clone(),
            language: Some(args.language.clone()),
            timeout: Duration::from_secs(args.timeout),
        }),
    }
}

fn artifact_stem(video: &Path) -> String {
    sanitize_stem(
        &video
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    )
}

fn validate_process(args: &ProcessArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.video.exists() {
        return Err(format!("Input file not found: {}", args.video.display()).into());
    }
    if args.fragment == 0 {
        return Err("Fragment length must be at least 1 second".into());
    }
    if !(1..=50).contains(&args.fps) {
        return Err(format!("GIF frame rate must be between 1 and 50, got {}", args.fps).into());
    }
    if args.transcriber == Backend::Http && args.http_url.is_none() {
        return Err("--http-url is required with --transcriber http".into());
    }
    if let Some(model) = &args.whisper_model {
        if !model.exists() {
            return Err(format!("Whisper model not found: {}", model.display()).into());
        }
    }
    if args.timeout == 0 {
        return Err("Timeout must be at least 1 second".into());
    }
    if args.font_size < 8 {
        return Err(format!("Font size must be at least 8 px, got {}", args.font_size).into());
    }
    if args.max_lines == 0 {
        return Err("Max lines must be at least 1".into());
    }
    Ok(())
}

fn validate_extract(args: &ExtractAudioArgs) -> Result<(), Box<dyn std::error::Error>> {
    if !args.video.exists() {
        return Err(format!("Input file not found: {}", args.video.display()).into());
    }
    if !(8000..=192_000).contains(&args.sample_rate) {
        return Err(format!(
            "Sample rate must be between 8000 and 192000 Hz, got {}",
            args.sample_rate
        )
        .into());
    }
    Ok(())
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading speech model... {pct}%");
    } else {
        eprint!("\rDownloading speech model... {downloaded} bytes");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    fn process_args(args: &[&str]) -> ProcessArgs {
        match parse(args).command {
            Command::Process(p) => p,
            Command::ExtractAudio(_) => panic!("expected process"),
        }
    }

    #[test]
    fn test_process_defaults() {
        let args = process_args(&["gifscribe", "process", "talk.mp4"]);
        assert_eq!(args.fragment, 5);
        assert_eq!(args.fps, 10);
        assert_eq!(args.transcriber, Backend::Whisper);
        assert_eq!(args.on_error, OnError::Continue);
        assert_eq!(args.output_dir, PathBuf::from("output"));
        assert_eq!(args.font_size, 48);
        assert_eq!(args.max_lines, 3);
    }

    #[test]
    fn test_http_backend_flags() {
        let args = process_args(&[
            "gifscribe",
            "process",
            "talk.mp4",
            "--transcriber",
            "http",
            "--http-url",
            "http://localhost:8000/v1/audio/transcriptions",
            "--timeout",
            "12",
            "--on-error",
            "abort",
        ]);
        match transcriber_settings(&args) {
            TranscriberSettings::Http(config) => {
                assert_eq!(config.url, "http://localhost:8000/v1/audio/transcriptions");
                assert_eq!(config.timeout, Duration::from_secs(12));
                assert_eq!(config.language.as_deref(), Some("en"));
            }
            other => panic!("expected http settings, got {other:?}"),
        }
        assert_eq!(args.on_error, OnError::Abort);
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        assert!(Cli::try_parse_from(["gifscribe", "process", "a.mp4", "--transcriber", "vosk"]).is_err());
    }

    #[test]
    fn test_validate_rejects_missing_input() {
        let args = process_args(&["gifscribe", "process", "/nonexistent/talk.mp4"]);
        let err = validate_process(&args).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_validate_requires_http_url() {
        let dir = std::env::temp_dir();
        let input = dir.to_str().unwrap();
        let args = process_args(&["gifscribe", "process", input, "--transcriber", "http"]);
        let err = validate_process(&args).unwrap_err();
        assert!(err.to_string().contains("--http-url"));
    }

    #[test]
    fn test_validate_rejects_zero_fragment() {
        let dir = std::env::temp_dir();
        let input = dir.to_str().unwrap();
        let args = process_args(&["gifscribe", "process", input, "--fragment", "0"]);
        assert!(validate_process(&args).is_err());
    }

    #[test]
    fn test_extract_audio_arguments() {
        match parse(&["gifscribe", "extract-audio", "in.mp4", "out.wav"]).command {
            Command::ExtractAudio(args) => {
                assert_eq!(args.output, PathBuf::from("out.wav"));
                assert_eq!(args.sample_rate, 16000);
            }
            Command::Process(_) => panic!("expected extract-audio"),
        }
    }

    #[test]
    fn test_artifact_stem_is_sanitized() {
        assert_eq!(artifact_stem(Path::new("/videos/My Talk.mp4")), "My_Talk");
        assert_eq!(artifact_stem(Path::new("clip")), "clip");
    }
}
