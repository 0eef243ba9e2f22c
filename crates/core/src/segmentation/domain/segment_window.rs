use serde::Serialize;
use thiserror::Error;

use crate::shared::time_span::TimeSpan;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WindowPlanError {
    #[error("fragment duration must be greater than zero")]
    ZeroFragment,
}

/// One fixed-duration slice `[start, end)` of the source video, in whole
/// seconds. `index` is the window's position in chronological order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct SegmentWindow {
    pub index: usize,
    pub start: u64,
    pub end: u64,
}

impl SegmentWindow {
    pub fn duration(&self) -> u64 {
        self.end - self.start
    }

    pub fn span(&self) -> TimeSpan {
        TimeSpan::new(self.start as f64, self.end as f64)
    }
}

impl std::fmt::Display for SegmentWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{} [{}s, {}s)", self.index, self.start, self.end)
    }
}

/// Partitions `[0, duration_secs)` into contiguous windows of
/// `fragment_secs`, clipping the last one to the total duration.
pub fn plan_windows(
    duration_secs: u64,
    fragment_secs: u64,
) -> Result<Vec<SegmentWindow>, WindowPlanError> {
    if fragment_secs == 0 {
        return Err(WindowPlanError::ZeroFragment);
    }

    Ok((0..duration_secs)
        .step_by(fragment_secs as usize)
        .enumerate()
        .map(|(index, start)| SegmentWindow {
            index,
            start,
            end: (start + fragment_secs).min(duration_secs),
        })
        .collect())
}
