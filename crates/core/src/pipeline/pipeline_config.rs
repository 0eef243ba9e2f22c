use std::fmt;
use std::str::FromStr;

use crate::shared::constants::DEFAULT_FRAGMENT_SECONDS;

/// What to do when one window fails.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the failure and move on to the next window.
    #[default]
    Continue,
    /// Stop at the first failed window.
    Abort,
}

impl FromStr for FailurePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "continue" => Ok(Self::Continue),
            "abort" => Ok(Self::Abort),
            other => Err(format!("unknown failure policy '{other}' (expected continue or abort)")),
        }
    }
}

impl fmt::Display for FailurePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Continue => write!(f, "continue"),
            Self::Abort => write!(f, "abort"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    pub fragment_seconds: u64,
    pub failure_policy: FailurePolicy,
    /// Namespace for artifact filenames; see
    /// [`artifact_file_name`](super::artifact::artifact_file_name).
    pub artifact_stem: String,
}

impl PipelineConfig {
    pub fn new(artifact_stem: impl Into<String>) -> Self {
        Self {
            fragment_seconds: DEFAULT_FRAGMENT_SECONDS,
            failure_policy: FailurePolicy::default(),
            artifact_stem: artifact_stem.into(),
        }
    }
}
