use std::io;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use axum::{
    body::{Body, Bytes},
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse, Json,
    },
    routing::{get, post},
    BoxError, Router,
};
use futures::{Stream, TryStreamExt};
use gifscribe_core::pipeline::artifact::ProcessReport;
use gifscribe_core::pipeline::pipeline_error::PipelineError;
use serde::Serialize;
use tempfile::TempPath;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::Semaphore;
use tokio::{fs::File, io::BufWriter};
use tokio_util::io::{ReaderStream, StreamReader};
use uuid::Uuid;

use crate::job::{run_job, CancelOnDrop, Job, JobError, JobSettings, TranscriberFactory};
use crate::progress_hub::ProgressHub;

const INDEX_HTML: &str = include_str!("index.html");

type ErrorResponse = (StatusCode, String);

#[derive(Clone)]
pub struct AppState {
    pub upload_dir: PathBuf,
    pub settings: Arc<JobSettings>,
    pub jobs: Arc<Semaphore>,
    pub hub: ProgressHub,
    pub transcriber: TranscriberFactory,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .route("/output/:filename", get(output))
        .route("/progress/:job_id", get(progress))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    gifs: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<FailedWindow>,
}

#[derive(Debug, Serialize)]
struct FailedWindow {
    index: usize,
    start: u64,
    end: u64,
    error: String,
}

impl From<&ProcessReport> for UploadResponse {
    fn from(report: &ProcessReport) -> Self {
        let gifs = report
            .artifacts
            .iter()
            .filter_map(|a| a.path.file_name())
            .map(|name| format!("/output/{}", name.to_string_lossy()))
            .collect();
        let failures = report
            .failures
            .iter()
            .map(|f| FailedWindow {
                index: f.window.index,
                start: f.window.start,
                end: f.window.end,
                error: f.error.to_string(),
            })
            .collect();
        Self { gifs, failures }
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

// Accepts a `video` file field and an optional `job_id`, then runs the
// pipeline and answers with the produced GIF URLs. The client's `job_id`
// only routes progress; GIF names get a fresh server-side id so a reused
// `job_id` never overwrites another upload's files.
async fn upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ErrorResponse> {
    let mut job_id: Option<String> = None;
    let mut video: Option<TempPath> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_request)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "job_id" => {
                let text = field.text().await.map_err(bad_request)?;
                job_id = Some(parse_job_id(&text)?);
            }
            "video" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                if file_name.is_empty() {
                    return Err((StatusCode::BAD_REQUEST, "No selected file".to_string()));
                }
                let path = spool_path(&state.upload_dir, &file_name)?;
                log::info!("Saving upload {file_name} to {}", path.display());
                stream_to_file(&path, field).await?;
                video = Some(path);
            }
            _ => continue,
        }
    }

    let video = video.ok_or_else(|| (StatusCode::BAD_REQUEST, "No file part".to_string()))?;
    let job_id = job_id.unwrap_or_else(|| Uuid::new_v4().to_string());

    let permit = state.jobs.clone().acquire_owned().await.map_err(internal)?;
    let cancelled = Arc::new(AtomicBool::new(false));
    let mut guard = CancelOnDrop::new(cancelled.clone());
    let job = Job {
        id: job_id,
        artifact_stem: Uuid::new_v4().to_string(),
        video: video.to_path_buf(),
        cancelled,
    };
    let settings = state.settings.clone();
    let make_transcriber = state.transcriber.clone();
    let hub = state.hub.clone();

    let result = tokio::task::spawn_blocking(move || {
        // Both live until the job ends, even if the client is gone.
        let _permit = permit;
        let _video = video;
        run_job(job, &settings, &make_transcriber, hub)
    })
    .await
    .map_err(internal)?;
    guard.disarm();

    let report = result.map_err(job_error)?;
    Ok(Json(UploadResponse::from(&report)))
}

async fn output(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> Result<impl IntoResponse, ErrorResponse> {
    if !is_plain_file_name(&filename) {
        return Err((StatusCode::BAD_REQUEST, "Invalid file name".to_string()));
    }

    let path = state.settings.output_dir.join(&filename);
    let file = File::open(&path).await.map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
        _ => internal(err),
    })?;

    let body = Body::from_stream(ReaderStream::new(file));
    Ok(([(header::CONTENT_TYPE, "image/gif")], body))
}

async fn progress(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    let rx = state.hub.subscribe();
    // Ends after the job's `JobEnd` event.
    let events = futures::stream::unfold((rx, job_id, false), |(mut rx, job_id, done)| async move {
        if done {
            return None;
        }
        loop {
            match rx.recv().await {
                Ok(progress) if progress.job_id == job_id => {
                    let end = progress.is_end();
                    let event = Event::default().json_data(&progress.event);
                    return Some((event, (rx, job_id, end)));
                }
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Progress stream for {job_id} skipped {skipped} events");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    });
    Sse::new(events).keep_alive(KeepAlive::default())
}

// Save a `Stream` to a file
async fn stream_to_file<S, E>(path: &std::path::Path, stream: S) -> Result<(), ErrorResponse>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
{
    async {
        let body_with_io_error = stream.map_err(|err| io::Error::new(io::ErrorKind::Other, err));
        let body_reader = StreamReader::new(body_with_io_error);
        futures::pin_mut!(body_reader);

        let mut file = BufWriter::new(File::create(path).await?);
        tokio::io::copy(&mut body_reader, &mut file).await?;
        tokio::io::AsyncWriteExt::flush(&mut file).await?;

        Ok::<_, io::Error>(())
    }
    .await
    .map_err(internal)
}

/// A scoped temporary in `dir` that keeps the upload's extension.
fn spool_path(dir: &std::path::Path, file_name: &str) -> Result<TempPath, ErrorResponse> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| format!(".{e}"))
        .unwrap_or_default();

    tempfile::Builder::new()
        .prefix("upload-")
        .suffix(&extension)
        .tempfile_in(dir)
        .map(|file| file.into_temp_path())
        .map_err(internal)
}

fn parse_job_id(text: &str) -> Result<String, ErrorResponse> {
    Uuid::parse_str(text.trim())
        .map(|id| id.to_string())
        .map_err(|_| (StatusCode::BAD_REQUEST, "Invalid job id".to_string()))
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('/')
        && !name.contains('\\')
        && !name.contains("..")
}

fn job_error(err: JobError) -> ErrorResponse {
    log::error!("Job failed: {err}");
    let status = match &err {
        JobError::Pipeline(PipelineError::Decode(_)) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, err.to_string())
}

fn bad_request<E: std::fmt::Display>(err: E) -> ErrorResponse {
    (StatusCode::BAD_REQUEST, err.to_string())
}

fn internal<E: std::fmt::Display>(err: E) -> ErrorResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
}
