//! Server configuration, read from the environment (and `.env`).

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use gifscribe_core::audio::infrastructure::http_transcriber::HttpTranscriberConfig;
use gifscribe_core::audio::infrastructure::transcriber_factory::{
    TranscriberKind, TranscriberSettings,
};
use gifscribe_core::pipeline::pipeline_config::FailurePolicy;
use gifscribe_core::shared::constants::{
    DEFAULT_FRAGMENT_SECONDS, DEFAULT_GIF_FPS, DEFAULT_TRANSCRIBE_TIMEOUT_SECS,
};
use thiserror::Error;

pub const DEFAULT_MAX_CONCURRENT_JOBS: usize = 2;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid {name}={value}: {reason}")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
    #[error("{0} must be set when TRANSCRIBER=http")]
    Missing(&'static str),
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: String,
    /// Where uploads are spooled while a job runs
    pub upload_dir: PathBuf,
    /// Where rendered GIFs are written and served from
    pub output_dir: PathBuf,
    pub fragment_seconds: u64,
    pub gif_fps: u32,
    pub max_concurrent_jobs: usize,
    pub failure_policy: FailurePolicy,
    pub transcriber: TranscriberSettings,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the configuration from any variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let fragment_seconds: u64 = parse(
            "FRAGMENT_SECONDS",
            lookup("FRAGMENT_SECONDS"),
            DEFAULT_FRAGMENT_SECONDS,
        )?;
        if fragment_seconds == 0 {
            return Err(invalid("FRAGMENT_SECONDS", "0", "must be at least 1"));
        }
        let gif_fps: u32 = parse("GIF_FPS", lookup("GIF_FPS"), DEFAULT_GIF_FPS)?;
        if !(1..=50).contains(&gif_fps) {
            return Err(invalid("GIF_FPS", &gif_fps.to_string(), "must be between 1 and 50"));
        }
        let max_concurrent_jobs: usize = parse(
            "MAX_CONCURRENT_JOBS",
            lookup("MAX_CONCURRENT_JOBS"),
            DEFAULT_MAX_CONCURRENT_JOBS,
        )?;
        if max_concurrent_jobs == 0 {
            return Err(invalid("MAX_CONCURRENT_JOBS", "0", "must be at least 1"));
        }

        let failure_policy = match lookup("FAILURE_POLICY") {
            Some(value) => value
                .parse()
                .map_err(|reason: String| invalid("FAILURE_POLICY", &value, &reason))?,
            None => FailurePolicy::default(),
        };

        let kind = match lookup("TRANSCRIBER") {
            Some(value) => value
                .parse()
                .map_err(|reason: String| invalid("TRANSCRIBER", &value, &reason))?,
            None => TranscriberKind::Whisper,
        };
        let language = var("TRANSCRIBE_LANGUAGE", "en");
        let transcriber = match kind {
            TranscriberKind::Whisper => TranscriberSettings::Whisper {
                model_path: lookup("WHISPER_MODEL").map(PathBuf::from),
                language,
            },
            TranscriberKind::Http => {
                let url = lookup("TRANSCRIBE_URL").ok_or(ConfigError::Missing("TRANSCRIBE_URL"))?;
                let timeout_secs: u64 = parse(
                    "TRANSCRIBE_TIMEOUT_SECS",
                    lookup("TRANSCRIBE_TIMEOUT_SECS"),
                    DEFAULT_TRANSCRIBE_TIMEOUT_SECS,
                )?;
                TranscriberSettings::Http(HttpTranscriberConfig {
                    url,
                    model: var("TRANSCRIBE_MODEL", "whisper-1"),
                    api_key: lookup("TRANSCRIBE_API_KEY"),
                    language: Some(language),
                    timeout: Duration::from_secs(timeout_secs.max(1)),
                })
            }
        };

        Ok(Self {
            addr: var("ADDR", "127.0.0.1"),
            port: var("PORT", "3000"),
            upload_dir: PathBuf::from(var("UPLOAD_DIR", "uploads")),
            output_dir: PathBuf::from(var("OUTPUT_DIR", "output")),
            fragment_seconds,
            gif_fps,
            max_concurrent_jobs,
            failure_policy,
            transcriber,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

fn parse<T>(name: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| invalid(name, &raw, &e.to_string())),
        None => Ok(default),
    }
}

fn invalid(name: &'static str, value: &str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}
