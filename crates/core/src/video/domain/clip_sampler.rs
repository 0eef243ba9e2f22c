use std::path::Path;

use super::decode_error::DecodeError;
use crate::shared::frame::Frame;
use crate::shared::time_span::TimeSpan;

/// A frame picked for an animation, with how long it stays on screen.
#[derive(Clone, Debug)]
pub struct ClipFrame {
    pub frame: Frame,
    pub delay_ms: u32,
}

/// Decodes the frames of one time span at a fixed output frame rate.
///
/// Frames are handed to `sink` one at a time, in presentation order, as soon
/// as their on-screen time is known; the delays sum to the span's duration.
/// `sink` returns `false` to stop decoding early. Returns the number of
/// frames handed over.
pub trait ClipSampler: Send {
    fn sample(
        &self,
        path: &Path,
        span: TimeSpan,
        fps: u32,
        sink: &mut dyn FnMut(ClipFrame) -> bool,
    ) -> Result<usize, DecodeError>;
}

/// Picks which decoded frames make it into an animation sampled at `fps`.
///
/// The span is divided into `ceil(duration * fps)` slots; the first decoded
/// frame landing in a not-yet-filled slot is kept. The first kept frame is
/// pinned to slot 0 so the animation starts at the span start.
#[derive(Debug)]
pub struct FramePacer {
    span: TimeSpan,
    fps: u32,
    total_slots: u64,
    last_slot: Option<u64>,
}

impl FramePacer {
    pub fn new(span: TimeSpan, fps: u32) -> Self {
        let fps = fps.max(1);
        let total_slots = (span.duration() * fps as f64 - 1e-9).ceil().max(0.0) as u64;
        Self {
            span,
            fps,
            total_slots,
            last_slot: None,
        }
    }

    pub fn total_slots(&self) -> u64 {
        self.total_slots
    }

    /// Returns the slot the frame presented at `time` fills, or `None` if the
    /// frame is dropped.
    pub fn accept(&mut self, time: f64) -> Option<u64> {
        if !self.span.contains(time) {
            return None;
        }
        let slot = ((time - self.span.start) * self.fps as f64 + 1e-6).floor() as u64;
        if slot >= self.total_slots {
            return None;
        }
        let slot = match self.last_slot {
            Some(last) if slot <= last => return None,
            Some(_) => slot,
            None => 0,
        };
        self.last_slot = Some(slot);
        Some(slot)
    }

    /// True once decoding has moved beyond the span.
    pub fn is_past_end(&self, time: f64) -> bool {
        time >= self.span.end
    }

    /// On-screen time of the frame in `slot` when the next kept frame fills
    /// `next`, or the span ends if there is none.
    pub fn hold_ms(&self, slot: u64, next: Option<u64>) -> u32 {
        let next = next.unwrap_or(self.total_slots);
        let slot_ms = 1000.0 / self.fps as f64;
        (next.saturating_sub(slot) as f64 * slot_ms).round() as u32
    }
}

/// Feeds paced frames to a sink, holding back one frame until the next kept
/// frame (or the end of the span) fixes its delay.
pub struct PacedFrames<'a> {
    pacer: FramePacer,
    sink: &'a mut dyn FnMut(ClipFrame) -> bool,
    held: Option<(Frame, u64)>,
    delivered: usize,
    stopped: bool,
}

impl<'a> PacedFrames<'a> {
    pub fn new(span: TimeSpan, fps: u32, sink: &'a mut dyn FnMut(ClipFrame) -> bool) -> Self {
        Self {
            pacer: FramePacer::new(span, fps),
            sink,
            held: None,
            delivered: 0,
            stopped: false,
        }
    }

    pub fn pacer(&self) -> &FramePacer {
        &self.pacer
    }

    /// See [`FramePacer::accept`].
    pub fn accept(&mut self, time: f64) -> Option<u64> {
        self.pacer.accept(time)
    }

    /// True when decoding can stop: past the span, or the sink asked to stop.
    pub fn is_done(&self, time: f64) -> bool {
        self.stopped || self.pacer.is_past_end(time)
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }

    /// Queues a frame for the slot returned by [`Self::accept`].
    pub fn push(&mut self, frame: Frame, slot: u64) {
        if let Some((previous, previous_slot)) = self.held.replace((frame, slot)) {
            self.deliver(previous, previous_slot, Some(slot));
        }
    }

    /// Hands over the held frame and returns how many frames were delivered.
    pub fn finish(mut self) -> usize {
        if let Some((frame, slot)) = self.held.take() {
            self.deliver(frame, slot, None);
        }
        self.delivered
    }

    fn deliver(&mut self, frame: Frame, slot: u64, next: Option<u64>) {
        if self.stopped {
            return;
        }
        let delay_ms = self.pacer.hold_ms(slot, next);
        self.delivered += 1;
        if !(self.sink)(ClipFrame { frame, delay_ms }) {
            self.stopped = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(t: f64) -> Frame {
        Frame::solid(2, 2, [0, 0, 0], t)
    }

    /// Runs `times` through a `PacedFrames` and collects (timestamp, delay).
    fn paced(span: TimeSpan, fps: u32, times: &[f64]) -> Vec<(f64, u32)> {
        let mut out = Vec::new();
        let mut sink = |f: ClipFrame| {
            out.push((f.frame.timestamp(), f.delay_ms));
            true
        };
        let mut frames = PacedFrames::new(span, fps, &mut sink);
        for &t in times {
            if frames.is_done(t) {
                break;
            }
            if let Some(slot) = frames.accept(t) {
                frames.push(frame(t), slot);
            }
        }
        frames.finish();
        out
    }

    #[test]
    fn test_total_slots_for_five_seconds_at_ten_fps() {
        let pacer = FramePacer::new(TimeSpan::new(5.0, 10.0), 10);
        assert_eq!(pacer.total_slots(), 50);
    }

    #[test]
    fn test_downsamples_thirty_fps_to_ten() {
        let times: Vec<f64> = (0..30).map(|i| i as f64 / 30.0).collect();
        let out = paced(TimeSpan::new(0.0, 1.0), 10, &times);
        assert_eq!(out.len(), 10);
        assert!(out.iter().all(|&(_, d)| d == 100));
    }

    #[test]
    fn test_low_frame_rate_frames_are_held_longer() {
        let out = paced(TimeSpan::new(0.0, 2.0), 10, &[0.0, 0.5, 1.0, 1.5]);
        let delays: Vec<u32> = out.iter().map(|&(_, d)| d).collect();
        assert_eq!(delays, vec![500, 500, 500, 500]);
    }

    #[test]
    fn test_delays_sum_to_span_duration() {
        let times: Vec<f64> = (0..80).map(|i| 9.9 + i as f64 / 24.0).collect();
        let out = paced(TimeSpan::new(10.0, 12.0), 10, &times);
        assert_eq!(out.iter().map(|&(_, d)| d).sum::<u32>(), 2000);
    }

    #[test]
    fn test_frames_outside_span_are_rejected() {
        let mut pacer = FramePacer::new(TimeSpan::new(5.0, 10.0), 10);
        assert_eq!(pacer.accept(4.9), None);
        assert_eq!(pacer.accept(10.0), None);
    }

    #[test]
    fn test_first_kept_frame_is_pinned_to_span_start() {
        let out = paced(TimeSpan::new(0.0, 1.0), 10, &[0.35]);
        assert_eq!(out, vec![(0.35, 1000)]);
    }

    #[test]
    fn test_is_past_end() {
        let pacer = FramePacer::new(TimeSpan::new(0.0, 5.0), 10);
        assert!(!pacer.is_past_end(4.99));
        assert!(pacer.is_past_end(5.0));
    }

    #[test]
    fn test_frames_reach_the_sink_one_behind_decoding() {
        let mut seen = 0;
        let mut sink = |_: ClipFrame| {
            seen += 1;
            true
        };
        let mut frames = PacedFrames::new(TimeSpan::new(0.0, 1.0), 10, &mut sink);
        let first = frames.accept(0.0).unwrap();
        frames.push(frame(0.0), first);
        let second = frames.accept(0.1).unwrap();
        frames.push(frame(0.1), second);
        assert_eq!(frames.finish(), 2);
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_sink_can_stop_decoding() {
        let mut sink = |_: ClipFrame| false;
        let mut frames = PacedFrames::new(TimeSpan::new(0.0, 1.0), 10, &mut sink);
        for (i, t) in [0.0, 0.1, 0.2].into_iter().enumerate() {
            assert!(!frames.is_done(t), "stopped early at frame {i}");
            let slot = frames.accept(t).unwrap();
            frames.push(frame(t), slot);
            if frames.is_stopped() {
                break;
            }
        }
        assert!(frames.is_stopped());
        assert!(frames.is_done(0.3));
        assert_eq!(frames.finish(), 1);
    }
}
