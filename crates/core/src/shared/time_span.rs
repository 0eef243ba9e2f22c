/// A half-open time range `[start, end)` in seconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeSpan {
    pub start: f64,
    pub end: f64,
}

impl TimeSpan {
    pub fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    pub fn contains(&self, time: f64) -> bool {
        time >= self.start && time < self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_duration() {
        assert_relative_eq!(TimeSpan::new(5.0, 10.0).duration(), 5.0);
    }

    #[test]
    fn test_inverted_span_has_zero_duration() {
        assert_relative_eq!(TimeSpan::new(3.0, 1.0).duration(), 0.0);
    }

    #[test]
    fn test_contains_is_half_open() {
        let span = TimeSpan::new(5.0, 10.0);
        assert!(span.contains(5.0));
        assert!(span.contains(9.99));
        assert!(!span.contains(10.0));
        assert!(!span.contains(4.99));
    }
}
