use serde::Serialize;

/// Stage a window just finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Extracted,
    Transcribed,
    Rendered,
    Failed,
}

impl Phase {
    /// Share of one window's work done once this phase is reached.
    fn weight(self) -> f64 {
        match self {
            Phase::Extracted => 1.0 / 3.0,
            Phase::Transcribed => 2.0 / 3.0,
            Phase::Rendered | Phase::Failed => 1.0,
        }
    }
}

/// Emitted by the pipeline after each stage of each window.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub window_index: usize,
    pub total_windows: usize,
    pub phase: Phase,
}

impl ProgressEvent {
    pub fn new(window_index: usize, total_windows: usize, phase: Phase) -> Self {
        Self {
            window_index,
            total_windows,
            phase,
        }
    }

    /// Overall completion in `[0, 1]`.
    pub fn fraction(&self) -> f64 {
        if self.total_windows == 0 {
            return 1.0;
        }
        ((self.window_index as f64 + self.phase.weight()) / self.total_windows as f64).min(1.0)
    }
}
