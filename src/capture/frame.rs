//! Per-frame capture result.

/// Metadata delivered by the camera service when a frame completes.
///
/// Only the fields the preview cares about are carried; pixel data goes
/// straight to the display surface and never reaches the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureResult {
    /// Monotonic frame counter assigned by the camera service.
    frame_number: u64,
    /// Start-of-exposure time in nanoseconds, if the sensor reported one.
    sensor_timestamp: Option<i64>,
}

impl CaptureResult {
    /// Creates a result carrying a sensor timestamp.
    pub fn new(frame_number: u64, sensor_timestamp: i64) -> Self {
        Self {
            frame_number,
            sensor_timestamp: Some(sensor_timestamp),
        }
    }

    /// Creates a result for a frame whose timestamp is missing.
    pub fn without_timestamp(frame_number: u64) -> Self {
        Self {
            frame_number,
            sensor_timestamp: None,
        }
    }

    /// Returns the frame number.
    #[inline]
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    /// Returns the sensor timestamp, if present.
    #[inline]
    pub fn sensor_timestamp(&self) -> Option<i64> {
        self.sensor_timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_creation() {
        let result = CaptureResult::new(7, 33_333_333);
        assert_eq!(result.frame_number(), 7);
        assert_eq!(result.sensor_timestamp(), Some(33_333_333));
    }

    #[test]
    fn test_missing_timestamp() {
        let result = CaptureResult::without_timestamp(1);
        assert_eq!(result.sensor_timestamp(), None);
    }
}
