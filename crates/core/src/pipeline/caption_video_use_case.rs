use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::audio::domain::transcriber::Transcriber;
use crate::audio::domain::transcript::Transcript;
use crate::caption::domain::caption_renderer::{CaptionRenderer, VideoSegment};
use crate::segmentation::domain::segment_window::{plan_windows, SegmentWindow};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::audio_extractor::AudioExtractor;
use crate::video::domain::decode_error::DecodeError;
use crate::video::domain::video_probe::VideoProbe;

use super::artifact::{artifact_file_name, Artifact, ProcessReport, WindowFailure};
use super::pipeline_config::{FailurePolicy, PipelineConfig};
use super::pipeline_error::{PipelineError, WindowError};
use super::pipeline_logger::{NullPipelineLogger, PipelineLogger};
use super::progress::{Phase, ProgressEvent};

/// Progress callback. Returning `false` cancels the run.
pub type ProgressCallback = Box<dyn Fn(&ProgressEvent) -> bool + Send>;

/// How a single window ended when it did not produce an artifact.
enum WindowOutcome {
    Failed(WindowError),
    Cancelled,
}

impl From<WindowError> for WindowOutcome {
    fn from(error: WindowError) -> Self {
        WindowOutcome::Failed(error)
    }
}

/// Splits a video into fixed windows and turns each one into a captioned
/// animation: extract the window's audio, transcribe it, render the frames
/// with the transcript burned in.
///
/// Windows are processed strictly in order; every stage blocks.
pub struct CaptionVideoUseCase {
    probe: Box<dyn VideoProbe>,
    extractor: Box<dyn AudioExtractor>,
    transcriber: Box<dyn Transcriber>,
    renderer: Box<dyn CaptionRenderer>,
    config: PipelineConfig,
    on_progress: Option<ProgressCallback>,
    cancelled: Arc<AtomicBool>,
    logger: Box<dyn PipelineLogger>,
}

impl CaptionVideoUseCase {
    pub fn new(
        probe: Box<dyn VideoProbe>,
        extractor: Box<dyn AudioExtractor>,
        transcriber: Box<dyn Transcriber>,
        renderer: Box<dyn CaptionRenderer>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            probe,
            extractor,
            transcriber,
            renderer,
            config,
            on_progress: None,
            cancelled: Arc::new(AtomicBool::new(false)),
            logger: Box::new(NullPipelineLogger),
        }
    }

    pub fn with_progress(mut self, on_progress: ProgressCallback) -> Self {
        self.on_progress = Some(on_progress);
        self
    }

    /// Shares a cancellation flag with the caller; it is checked before
    /// every stage.
    pub fn with_cancellation(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    pub fn with_logger(mut self, logger: Box<dyn PipelineLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn process(
        &mut self,
        video_path: &Path,
        output_dir: &Path,
    ) -> Result<ProcessReport, PipelineError> {
        if self.config.fragment_seconds == 0 {
            return Err(PipelineError::InvalidFragment);
        }

        let metadata = self.probe.probe(video_path)?;
        let windows = plan_windows(metadata.whole_seconds(), self.config.fragment_seconds)
            .map_err(|_| PipelineError::InvalidFragment)?;
        let total = windows.len();

        self.logger.info(&format!(
            "{}: {}x{}, {:.2}s, {} window(s) of {}s, transcriber: {}",
            video_path.display(),
            metadata.width,
            metadata.height,
            metadata.duration_secs,
            total,
            self.config.fragment_seconds,
            self.transcriber.name()
        ));

        fs::create_dir_all(output_dir)?;

        let mut report = ProcessReport::default();
        for window in windows {
            match self.process_window(video_path, &metadata, window, total, output_dir) {
                Ok(artifact) => report.artifacts.push(artifact),
                Err(WindowOutcome::Cancelled) => {
                    self.logger.info(&format!("Cancelled before finishing window {window}"));
                    return Err(PipelineError::Cancelled {
                        completed: report.artifacts,
                    });
                }
                Err(WindowOutcome::Failed(error)) => {
                    self.logger.warn(&format!("Window {window} failed: {error}"));
                    self.emit(ProgressEvent::new(window.index, total, Phase::Failed));
                    match self.config.failure_policy {
                        FailurePolicy::Abort => {
                            return Err(PipelineError::Window {
                                window,
                                source: error,
                                completed: report.artifacts,
                            });
                        }
                        FailurePolicy::Continue => {
                            report.failures.push(WindowFailure { window, error });
                        }
                    }
                }
            }
            self.logger.progress(window.index + 1, total);
        }

        self.logger.summary();
        Ok(report)
    }

    fn process_window(
        &mut self,
        video_path: &Path,
        metadata: &VideoMetadata,
        window: SegmentWindow,
        total: usize,
        output_dir: &Path,
    ) -> Result<Artifact, WindowOutcome> {
        self.check_cancelled()?;

        // Removed when dropped, whichever way this function returns.
        let audio_path = tempfile::Builder::new()
            .prefix("gifscribe-audio-")
            .suffix(".wav")
            .tempfile()
            .map_err(|e| WindowError::Extraction(DecodeError::Io(e)))?
            .into_temp_path();

        let t0 = Instant::now();
        let clip = if metadata.has_audio {
            self.extractor
                .extract(video_path, Some(window.span()), &audio_path)
                .map_err(WindowError::Extraction)?
        } else {
            None
        };
        self.logger.timing("extract", elapsed_ms(t0));
        self.emit(ProgressEvent::new(window.index, total, Phase::Extracted));
        self.check_cancelled()?;

        let t0 = Instant::now();
        let transcript = match &clip {
            Some(clip) => self
                .transcriber
                .transcribe(clip)
                .map_err(WindowError::Transcription)?,
            None => Transcript::NoSpeech,
        };
        drop(audio_path);
        self.logger.timing("transcribe", elapsed_ms(t0));
        self.logger
            .metric("caption_chars", transcript.caption_text().chars().count() as f64);
        self.emit(ProgressEvent::new(window.index, total, Phase::Transcribed));
        self.check_cancelled()?;

        let t0 = Instant::now();
        let segment = VideoSegment {
            source: video_path.to_path_buf(),
            window,
            metadata: metadata.clone(),
        };
        let output_path = output_dir.join(artifact_file_name(&self.config.artifact_stem, &window));
        let path = self
            .renderer
            .render(&segment, transcript.caption_text(), &output_path)
            .map_err(WindowError::Render)?;
        self.logger.timing("render", elapsed_ms(t0));
        self.emit(ProgressEvent::new(window.index, total, Phase::Rendered));

        Ok(Artifact {
            window,
            path,
            caption: transcript,
        })
    }

    fn check_cancelled(&self) -> Result<(), WindowOutcome> {
        if self.cancelled.load(Ordering::Relaxed) {
            Err(WindowOutcome::Cancelled)
        } else {
            Ok(())
        }
    }

    fn emit(&self, event: ProgressEvent) {
        if let Some(ref cb) = self.on_progress {
            if !cb(&event) {
                self.cancelled.store(true, Ordering::Relaxed);
            }
        }
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
