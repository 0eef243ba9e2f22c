//! One upload's trip through the pipeline, run on a blocking thread.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use gifscribe_core::audio::domain::transcriber::Transcriber;
use gifscribe_core::audio::infrastructure::transcriber_factory::TranscriberSetupError;
use gifscribe_core::caption::domain::caption_style::CaptionStyle;
use gifscribe_core::pipeline::artifact::ProcessReport;
use gifscribe_core::pipeline::pipeline_config::{FailurePolicy, PipelineConfig};
use gifscribe_core::pipeline::pipeline_error::PipelineError;
use gifscribe_core::pipeline::pipeline_factory::create_pipeline;
use gifscribe_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use gifscribe_core::pipeline::progress::ProgressEvent;
use thiserror::Error;

use crate::progress_hub::{JobEnd, ProgressHub};

/// Builds a fresh transcriber for each job. Backends are not shared
/// between threads.
pub type TranscriberFactory =
    Arc<dyn Fn() -> Result<Box<dyn Transcriber>, TranscriberSetupError> + Send + Sync>;

#[derive(Error, Debug)]
pub enum JobError {
    #[error("transcriber unavailable: {0}")]
    Setup(#[from] TranscriberSetupError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Pipeline settings shared by every job.
#[derive(Clone, Debug)]
pub struct JobSettings {
    pub output_dir: PathBuf,
    pub fragment_seconds: u64,
    pub gif_fps: u32,
    pub failure_policy: FailurePolicy,
    pub style: CaptionStyle,
}

pub struct Job {
    /// Key progress is published under. May be chosen by the client.
    pub id: String,
    /// Names this job's GIFs. Always generated by the server.
    pub artifact_stem: String,
    pub video: PathBuf,
    pub cancelled: Arc<AtomicBool>,
}

/// Runs the pipeline for `job`, publishing progress to `hub`. Every run
/// ends with one [`JobEnd`] event, whether it succeeded, failed or was
/// cancelled.
pub fn run_job(
    job: Job,
    settings: &JobSettings,
    make_transcriber: &TranscriberFactory,
    hub: ProgressHub,
) -> Result<ProcessReport, JobError> {
    let job_id = job.id.clone();
    let result = process(job, settings, make_transcriber, hub.clone());
    let end = match &result {
        Ok(report) => JobEnd::Finished {
            gifs: report.artifacts.len(),
            failures: report.failures.len(),
        },
        Err(err) => JobEnd::Error {
            message: err.to_string(),
        },
    };
    hub.publish(&job_id, end);
    result
}

fn process(
    job: Job,
    settings: &JobSettings,
    make_transcriber: &TranscriberFactory,
    hub: ProgressHub,
) -> Result<ProcessReport, JobError> {
    let transcriber = make_transcriber()?;
    log::info!("Job {}: transcribing with {}", job.id, transcriber.name());

    let config = PipelineConfig {
        fragment_seconds: settings.fragment_seconds,
        failure_policy: settings.failure_policy,
        artifact_stem: job.artifact_stem,
    };
    let job_id = job.id.clone();
    let progress = Box::new(move |event: &ProgressEvent| {
        hub.publish(&job_id, *event);
        true
    });

    let mut pipeline = create_pipeline(transcriber, settings.style.clone(), settings.gif_fps, config)
        .with_progress(progress)
        .with_cancellation(job.cancelled)
        .with_logger(Box::new(StdoutPipelineLogger::default()));

    let report = pipeline.process(&job.video, &settings.output_dir)?;
    log::info!(
        "Job {}: {} GIF(s), {} failed window(s)",
        job.id,
        report.artifacts.len(),
        report.failures.len()
    );
    Ok(report)
}

/// Raises the cancel flag when dropped while still armed, which happens
/// when the client goes away before the job finishes.
pub struct CancelOnDrop {
    flag: Arc<AtomicBool>,
    armed: bool,
}

impl CancelOnDrop {
    pub fn new(flag: Arc<AtomicBool>) -> Self {
        Self { flag, armed: true }
    }

    pub fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        if self.armed {
            log::info!("Client went away, cancelling job");
            self.flag.store(true, Ordering::Relaxed);
        }
    }
}
