/// A segment of decoded audio: interleaved PCM samples normalized to [-1.0, 1.0].
#[derive(Clone, Debug)]
pub struct AudioSegment {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
}

impl AudioSegment {
    pub fn new(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Self {
        Self {
            samples,
            sample_rate,
            channels,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn duration(&self) -> f64 {
        self.samples.len() as f64 / (self.sample_rate as f64 * self.channels as f64)
    }

    /// Index of the first interleaved sample at `time` seconds, aligned to a
    /// channel frame boundary.
    pub fn sample_index_at_time(&self, time: f64) -> usize {
        let frames = (time.max(0.0) * self.sample_rate as f64) as usize;
        frames * self.channels as usize
    }

    /// Keeps only the samples in `[start, end)` seconds, relative to the
    /// segment's first sample. Out-of-range bounds are clamped.
    pub fn trim(&mut self, start: f64, end: f64) {
        let len = self.samples.len();
        let from = self.sample_index_at_time(start).min(len);
        let to = self.sample_index_at_time(end).clamp(from, len);
        self.samples.truncate(to);
        self.samples.drain(..from);
    }

    /// Root-mean-square level, 0.0 for an empty segment.
    pub fn rms(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.samples.iter().map(|s| (*s as f64).powi(2)).sum();
        (sum / self.samples.len() as f64).sqrt() as f32
    }
}
