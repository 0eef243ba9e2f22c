use std::path::PathBuf;

use serde::Serialize;

use crate::audio::domain::transcript::Transcript;
use crate::segmentation::domain::segment_window::SegmentWindow;
use crate::shared::constants::ARTIFACT_EXTENSION;

use super::pipeline_error::WindowError;

/// The captioned animation produced for one window.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Artifact {
    pub window: SegmentWindow,
    pub path: PathBuf,
    pub caption: Transcript,
}

/// A window that failed while the run carried on.
#[derive(Debug)]
pub struct WindowFailure {
    pub window: SegmentWindow,
    pub error: WindowError,
}

/// Everything one run produced, in window order.
#[derive(Debug, Default)]
pub struct ProcessReport {
    pub artifacts: Vec<Artifact>,
    pub failures: Vec<WindowFailure>,
}

impl ProcessReport {
    pub fn window_count(&self) -> usize {
        self.artifacts.len() + self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// `fragment_<stem>_<start>_<end>.gif`
pub fn artifact_file_name(stem: &str, window: &SegmentWindow) -> String {
    format!(
        "fragment_{stem}_{}_{}.{ARTIFACT_EXTENSION}",
        window.start, window.end
    )
}

/// Reduces a file stem to `[A-Za-z0-9_-]`, so it is safe inside an artifact name.
pub fn sanitize_stem(stem: &str) -> String {
    let cleaned: String = stem
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('_');
    if trimmed.is_empty() {
        "video".to_string()
    } else {
        trimmed.to_string()
    }
}
