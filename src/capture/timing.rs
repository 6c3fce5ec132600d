//! Frame timing via consecutive sensor timestamps.
//!
//! Each completed frame is compared against the one before it. The
//! previous timestamp starts at zero, so the first delta equals the first
//! timestamp. No windowing or averaging is applied.

use super::CaptureResult;

/// Tracks the previous sensor timestamp and yields per-frame deltas.
#[derive(Debug, Default, Clone)]
pub struct FrameTimer {
    /// Timestamp of the previous frame in nanoseconds.
    previous: i64,
    /// Delta computed for the most recent frame.
    last_delta: Option<i64>,
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a frame and returns `current - previous`.
    ///
    /// A missing sensor timestamp reads as zero.
    pub fn record(&mut self, result: &CaptureResult) -> i64 {
        let current = result.sensor_timestamp().unwrap_or(0);
        let delta = current.wrapping_sub(self.previous);
        self.previous = current;
        self.last_delta = Some(delta);
        delta
    }

    /// Returns the previous frame's timestamp.
    pub fn previous(&self) -> i64 {
        self.previous
    }

    /// Returns the most recent delta, if any frame has been recorded.
    pub fn last_delta(&self) -> Option<i64> {
        self.last_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deltas(timestamps: &[i64]) -> Vec<i64> {
        let mut timer = FrameTimer::new();
        timestamps
            .iter()
            .enumerate()
            .map(|(i, &ts)| timer.record(&CaptureResult::new(i as u64, ts)))
            .collect()
    }

    #[test]
    fn test_first_delta_is_seeded_from_zero() {
        assert_eq!(deltas(&[1000]), vec![1000]);
    }

    #[test]
    fn test_out_of_order_timestamps_go_negative() {
        assert_eq!(deltas(&[1000, 1500, 1300]), vec![1000, 500, -200]);
    }

    #[test]
    fn test_missing_timestamp_reads_as_zero() {
        let mut timer = FrameTimer::new();
        timer.record(&CaptureResult::new(1, 2000));
        let delta = timer.record(&CaptureResult::without_timestamp(2));

        assert_eq!(delta, -2000);
        assert_eq!(timer.previous(), 0);
        assert_eq!(timer.last_delta(), Some(-2000));
    }
}
