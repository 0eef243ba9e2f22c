mod config;
mod job;
mod progress_hub;
mod routes;

use std::fs;
use std::process;
use std::sync::Arc;

use gifscribe_core::audio::infrastructure::transcriber_factory::{
    create_transcriber, TranscriberSettings,
};
use gifscribe_core::caption::domain::caption_style::CaptionStyle;
use gifscribe_core::shared::constants::{WHISPER_MODEL_NAME, WHISPER_MODEL_URL};
use gifscribe_core::shared::model_resolver;
use tokio::sync::Semaphore;

use crate::config::ServerConfig;
use crate::job::{JobSettings, TranscriberFactory};
use crate::progress_hub::ProgressHub;
use crate::routes::{router, AppState};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run().await {
        log::error!("{e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;
    fs::create_dir_all(&config.upload_dir)?;
    fs::create_dir_all(&config.output_dir)?;

    let settings = resolve_model(config.transcriber.clone()).await?;
    log::info!("Transcriber: {}", settings.kind());
    let transcriber: TranscriberFactory =
        Arc::new(move || create_transcriber(settings.clone(), None));

    let state = AppState {
        upload_dir: config.upload_dir.clone(),
        settings: Arc::new(JobSettings {
            output_dir: config.output_dir.clone(),
            fragment_seconds: config.fragment_seconds,
            gif_fps: config.gif_fps,
            failure_policy: config.failure_policy,
            style: CaptionStyle::default(),
        }),
        jobs: Arc::new(Semaphore::new(config.max_concurrent_jobs)),
        hub: ProgressHub::default(),
        transcriber,
    };

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    log::info!(
        "Listening at {} (fragments of {}s, {} concurrent job(s))",
        config.bind_address(),
        config.fragment_seconds,
        config.max_concurrent_jobs
    );
    axum::serve(listener, router(state)).await?;
    Ok(())
}

/// Pins the whisper model path once at startup so jobs never download.
async fn resolve_model(
    settings: TranscriberSettings,
) -> Result<TranscriberSettings, Box<dyn std::error::Error>> {
    match settings {
        TranscriberSettings::Whisper {
            model_path: None,
            language,
        } => {
            let path = tokio::task::spawn_blocking(|| {
                model_resolver::resolve(WHISPER_MODEL_NAME, WHISPER_MODEL_URL, None, None)
            })
            .await??;
            log::info!("Using whisper model {}", path.display());
            Ok(TranscriberSettings::Whisper {
                model_path: Some(path),
                language,
            })
        }
        other => Ok(other),
    }
}
