//! Prometheus metrics for the camera preview.
//!
//! # Metrics Exposed
//!
//! ## Device Lifecycle
//! - `camera2_preview_camera_opens_total` - Open requests issued
//! - `camera2_preview_camera_closes_total` - Devices closed
//! - `camera2_preview_device_disconnects_total` - Devices lost to a disconnect
//! - `camera2_preview_device_errors_total` - Device errors reported
//!
//! ## Session
//! - `camera2_preview_session_configure_failures_total` - Failed session configurations
//! - `camera2_preview_stale_completions_total` - Completions that outlived their request
//!
//! ## Frames
//! - `camera2_preview_frames_total` - Capture completions while streaming
//! - `camera2_preview_frame_delta_nanoseconds` - Latest sensor timestamp delta
//!
//! ## State
//! - `camera2_preview_camera_state` - Coordinator state
//! - `camera2_preview_state_transitions_total{from,to}` - State transitions
//!
//! # Example
//!
//! ```no_run
//! use camera2_preview::metrics::PreviewMetrics;
//!
//! let metrics = PreviewMetrics::new().expect("Failed to create registry");
//! metrics.record_frame(33_333_333);
//! println!("{}", metrics.encode().unwrap());
//! ```

mod collector;

pub use collector::{MetricsError, PreviewMetrics};
