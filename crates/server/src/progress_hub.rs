use gifscribe_core::pipeline::progress::ProgressEvent;
use serde::Serialize;
use tokio::sync::broadcast;

/// The outcome published once a job stops, whatever made it stop.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "lowercase")]
pub enum JobEnd {
    Finished { gifs: usize, failures: usize },
    Error { message: String },
}

/// What `/progress` subscribers receive for a job: per-window progress,
/// then exactly one [`JobEnd`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobEvent {
    Window(ProgressEvent),
    End(JobEnd),
}

impl From<ProgressEvent> for JobEvent {
    fn from(event: ProgressEvent) -> Self {
        Self::Window(event)
    }
}

impl From<JobEnd> for JobEvent {
    fn from(end: JobEnd) -> Self {
        Self::End(end)
    }
}

/// A job event tagged with the job it belongs to.
#[derive(Clone, Debug, PartialEq)]
pub struct JobProgress {
    pub job_id: String,
    pub event: JobEvent,
}

impl JobProgress {
    pub fn is_end(&self) -> bool {
        matches!(self.event, JobEvent::End(_))
    }
}

/// Fans job progress out to every `/progress` subscriber.
#[derive(Clone, Debug)]
pub struct ProgressHub {
    sender: broadcast::Sender<JobProgress>,
}

impl ProgressHub {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns the number of subscribers reached. Having none is normal.
    pub fn publish(&self, job_id: &str, event: impl Into<JobEvent>) -> usize {
        self.sender
            .send(JobProgress {
                job_id: job_id.to_string(),
                event: event.into(),
            })
            .unwrap_or(0)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobProgress> {
        self.sender.subscribe()
    }
}

impl Default for ProgressHub {
    fn default() -> Self {
        // A job emits at most three events per window.
        Self::new(256)
    }
}
