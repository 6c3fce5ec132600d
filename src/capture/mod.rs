//! Preview configuration, capture requests and frame timing.
//!
//! Nothing in this module touches pixel data. The camera service renders
//! frames directly into the display surface; the preview only sees the
//! per-frame metadata it needs for timing.

mod config;
mod frame;
mod request;
mod timing;

pub use config::{
    ConfigError, FileConfig, PlatformConfig, PreviewConfig, SimulationConfig,
    SESSION_CONFIGURATION_MIN_API,
};
pub use frame::CaptureResult;
pub use request::{FpsRange, PreviewRequestSpec, RequestTemplate};
pub use timing::FrameTimer;
