//! Preview capture request.

use super::PreviewConfig;
use crate::platform::SurfaceHandle;

/// Inclusive auto-exposure target frame-rate range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FpsRange {
    pub lower: u32,
    pub upper: u32,
}

impl FpsRange {
    /// A range pinned to a single rate.
    pub fn fixed(fps: u32) -> Self {
        Self {
            lower: fps,
            upper: fps,
        }
    }
}

/// Capture request templates understood by the camera service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestTemplate {
    Preview,
}

/// Immutable preview request, built once per session.
///
/// The same request is handed to the session as its session parameters
/// (where supported) and reused by the repeating request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewRequestSpec {
    template: RequestTemplate,
    target: SurfaceHandle,
    fps_range: FpsRange,
}

impl PreviewRequestSpec {
    /// Builds a preview request targeting `surface` at the configured rate.
    pub fn preview(target: SurfaceHandle, config: &PreviewConfig) -> Self {
        Self {
            template: RequestTemplate::Preview,
            target,
            fps_range: FpsRange::fixed(config.fps),
        }
    }

    pub fn template(&self) -> RequestTemplate {
        self.template
    }

    pub fn target(&self) -> SurfaceHandle {
        self.target
    }

    pub fn fps_range(&self) -> FpsRange {
        self.fps_range
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_request_pins_frame_rate() {
        let request = PreviewRequestSpec::preview(SurfaceHandle(3), &PreviewConfig::default());

        assert_eq!(request.template(), RequestTemplate::Preview);
        assert_eq!(request.target(), SurfaceHandle(3));
        assert_eq!(request.fps_range(), FpsRange { lower: 30, upper: 30 });
    }
}
