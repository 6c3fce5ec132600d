//! Metrics collection and registry.

use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};
use thiserror::Error;

use crate::coordinator::CameraState;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// Prometheus metrics registry for the camera preview.
///
/// Counters are updated by the coordinator as events are handled; there
/// is no separate snapshot step.
#[derive(Clone)]
pub struct PreviewMetrics {
    registry: Registry,

    // Device lifecycle
    camera_opens: IntCounter,
    camera_closes: IntCounter,
    device_disconnects: IntCounter,
    device_errors: IntCounter,

    // Session
    configure_failures: IntCounter,
    stale_completions: IntCounter,

    // Frames
    frames: IntCounter,
    frame_delta_ns: IntGauge,

    camera_state: IntGauge,
    state_transitions: IntCounterVec,
}

impl PreviewMetrics {
    /// Creates a registry with all preview metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let camera_opens = IntCounter::new(
            "camera2_preview_camera_opens_total",
            "Camera open requests issued",
        )?;
        let camera_closes = IntCounter::new(
            "camera2_preview_camera_closes_total",
            "Camera devices closed",
        )?;
        let device_disconnects = IntCounter::new(
            "camera2_preview_device_disconnects_total",
            "Open devices lost to a disconnect",
        )?;
        let device_errors = IntCounter::new(
            "camera2_preview_device_errors_total",
            "Device errors reported by the camera service",
        )?;
        let configure_failures = IntCounter::new(
            "camera2_preview_session_configure_failures_total",
            "Capture sessions that failed to configure",
        )?;
        let stale_completions = IntCounter::new(
            "camera2_preview_stale_completions_total",
            "Completions discarded because they outlived their request",
        )?;
        let frames = IntCounter::new(
            "camera2_preview_frames_total",
            "Capture completions received while streaming",
        )?;
        let frame_delta_ns = IntGauge::new(
            "camera2_preview_frame_delta_nanoseconds",
            "Sensor timestamp delta of the most recent frame",
        )?;
        let camera_state = IntGauge::new(
            "camera2_preview_camera_state",
            "Coordinator state (0=idle, 1=opening, 2=configuring, 3=streaming)",
        )?;
        let state_transitions = IntCounterVec::new(
            Opts::new(
                "camera2_preview_state_transitions_total",
                "Coordinator state transitions",
            ),
            &["from", "to"],
        )?;

        registry.register(Box::new(camera_opens.clone()))?;
        registry.register(Box::new(camera_closes.clone()))?;
        registry.register(Box::new(device_disconnects.clone()))?;
        registry.register(Box::new(device_errors.clone()))?;
        registry.register(Box::new(configure_failures.clone()))?;
        registry.register(Box::new(stale_completions.clone()))?;
        registry.register(Box::new(frames.clone()))?;
        registry.register(Box::new(frame_delta_ns.clone()))?;
        registry.register(Box::new(camera_state.clone()))?;
        registry.register(Box::new(state_transitions.clone()))?;

        Ok(Self {
            registry,
            camera_opens,
            camera_closes,
            device_disconnects,
            device_errors,
            configure_failures,
            stale_completions,
            frames,
            frame_delta_ns,
            camera_state,
            state_transitions,
        })
    }

    pub fn record_open(&self) {
        self.camera_opens.inc();
    }

    pub fn record_close(&self) {
        self.camera_closes.inc();
    }

    pub fn record_disconnect(&self) {
        self.device_disconnects.inc();
    }

    pub fn record_device_error(&self) {
        self.device_errors.inc();
    }

    pub fn record_configure_failure(&self) {
        self.configure_failures.inc();
    }

    pub fn record_stale_completion(&self) {
        self.stale_completions.inc();
    }

    /// Counts a frame and publishes its timestamp delta.
    pub fn record_frame(&self, delta_ns: i64) {
        self.frames.inc();
        self.frame_delta_ns.set(delta_ns);
    }

    pub fn set_state(&self, state: CameraState) {
        self.camera_state.set(state.as_gauge());
    }

    pub fn record_transition(&self, from: CameraState, to: CameraState) {
        self.state_transitions
            .with_label_values(&[from.name(), to.name()])
            .inc();
    }

    /// Camera open requests issued so far.
    pub fn opens(&self) -> u64 {
        self.camera_opens.get()
    }

    /// Devices closed so far.
    pub fn closes(&self) -> u64 {
        self.camera_closes.get()
    }

    /// Frames received so far.
    pub fn frames(&self) -> u64 {
        self.frames.get()
    }

    /// Transitions recorded from `from` to `to` so far.
    pub fn transitions(&self, from: CameraState, to: CameraState) -> u64 {
        self.state_transitions
            .with_label_values(&[from.name(), to.name()])
            .get()
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_creation() {
        let metrics = PreviewMetrics::new();
        assert!(metrics.is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let metrics = PreviewMetrics::new().unwrap();

        metrics.record_open();
        metrics.record_frame(33_333_333);
        metrics.record_frame(-200);
        metrics.set_state(CameraState::Streaming);

        let output = metrics.encode().unwrap();
        assert!(output.contains("camera2_preview_camera_opens_total 1"));
        assert!(output.contains("camera2_preview_frames_total 2"));
        assert!(output.contains("camera2_preview_frame_delta_nanoseconds -200"));
        assert!(output.contains("camera2_preview_camera_state 3"));
        assert_eq!(metrics.opens(), 1);
        assert_eq!(metrics.frames(), 2);
    }

    #[test]
    fn test_metrics_encode() {
        let metrics = PreviewMetrics::new().unwrap();
        let output = metrics.encode().unwrap();

        assert!(output.contains("camera2_preview_camera_closes_total"));
        assert!(output.contains("camera2_preview_session_configure_failures_total"));
        assert!(output.contains("camera2_preview_stale_completions_total"));
    }

    #[test]
    fn test_transitions_are_labelled() {
        let metrics = PreviewMetrics::new().unwrap();
        metrics.record_transition(CameraState::Streaming, CameraState::Idle);

        let output = metrics.encode().unwrap();
        assert!(output.contains(
            "camera2_preview_state_transitions_total{from=\"streaming\",to=\"idle\"} 1"
        ));
        assert_eq!(metrics.transitions(CameraState::Streaming, CameraState::Idle), 1);
        assert_eq!(metrics.transitions(CameraState::Idle, CameraState::Streaming), 0);
    }
}
