use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct VideoMetadata {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub duration_secs: f64,
    pub codec: String,
    pub has_audio: bool,
    pub source_path: Option<PathBuf>,
}

impl VideoMetadata {
    /// Whole seconds of video, the unit windows are planned in.
    pub fn whole_seconds(&self) -> u64 {
        if self.duration_secs.is_finite() && self.duration_secs > 0.0 {
            self.duration_secs.floor() as u64
        } else {
            0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(duration_secs: f64) -> VideoMetadata {
        VideoMetadata {
            width: 1920,
            height: 1080,
            fps: 30.0,
            duration_secs,
            codec: "h264".to_string(),
            has_audio: true,
            source_path: Some(PathBuf::from("/tmp/test.mp4")),
        }
    }

    #[test]
    fn test_construction() {
        let m = meta(12.4);
        assert_eq!(m.width, 1920);
        assert_eq!(m.height, 1080);
        assert_eq!(m.codec, "h264");
        assert!(m.has_audio);
        assert_eq!(m.source_path, Some(PathBuf::from("/tmp/test.mp4")));
    }

    #[test]
    fn test_whole_seconds_truncates() {
        assert_eq!(meta(12.9).whole_seconds(), 12);
        assert_eq!(meta(12.0).whole_seconds(), 12);
    }

    #[test]
    fn test_whole_seconds_of_sub_second_video_is_zero() {
        assert_eq!(meta(0.7).whole_seconds(), 0);
    }

    #[test]
    fn test_whole_seconds_rejects_garbage_durations() {
        assert_eq!(meta(-1.0).whole_seconds(), 0);
        assert_eq!(meta(f64::NAN).whole_seconds(), 0);
    }
}
