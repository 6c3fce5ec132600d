//! Coordinator state.

use std::fmt;

use crate::capture::PreviewRequestSpec;
use crate::platform::{DeviceHandle, RequestToken, SessionHandle, SurfaceHandle};

/// The three inputs that decide whether the camera should run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSignals {
    /// The activity is in the foreground.
    pub app_resumed: bool,
    /// The camera permission is granted.
    pub has_permission: bool,
    /// The display surface, while it exists.
    pub surface: Option<SurfaceHandle>,
}

impl RunSignals {
    /// The run condition: all three signals are up.
    pub fn should_run(&self) -> bool {
        self.app_resumed && self.has_permission && self.surface.is_some()
    }
}

/// Externally visible coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraState {
    Idle,
    Opening,
    SessionConfiguring,
    Streaming,
}

impl CameraState {
    /// Value published on the state gauge.
    pub fn as_gauge(self) -> i64 {
        match self {
            CameraState::Idle => 0,
            CameraState::Opening => 1,
            CameraState::SessionConfiguring => 2,
            CameraState::Streaming => 3,
        }
    }

    /// Lowercase name used in logs and metric labels.
    pub fn name(self) -> &'static str {
        match self {
            CameraState::Idle => "idle",
            CameraState::Opening => "opening",
            CameraState::SessionConfiguring => "session-configuring",
            CameraState::Streaming => "streaming",
        }
    }
}

impl fmt::Display for CameraState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Internal state with the handles each state owns.
///
/// Handles live inside the variant that owns them, so leaving a state
/// drops device, session and request together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Stage {
    Idle,
    Opening {
        token: RequestToken,
    },
    SessionConfiguring {
        token: RequestToken,
        device: DeviceHandle,
        request: PreviewRequestSpec,
    },
    Streaming {
        token: RequestToken,
        device: DeviceHandle,
        session: SessionHandle,
        request: PreviewRequestSpec,
    },
}

impl Stage {
    pub(crate) fn state(&self) -> CameraState {
        match self {
            Stage::Idle => CameraState::Idle,
            Stage::Opening { .. } => CameraState::Opening,
            Stage::SessionConfiguring { .. } => CameraState::SessionConfiguring,
            Stage::Streaming { .. } => CameraState::Streaming,
        }
    }

    pub(crate) fn token(&self) -> Option<RequestToken> {
        match self {
            Stage::Idle => None,
            Stage::Opening { token }
            | Stage::SessionConfiguring { token, .. }
            | Stage::Streaming { token, .. } => Some(*token),
        }
    }

    pub(crate) fn device(&self) -> Option<DeviceHandle> {
        match self {
            Stage::SessionConfiguring { device, .. } | Stage::Streaming { device, .. } => {
                Some(*device)
            }
            _ => None,
        }
    }

    pub(crate) fn session(&self) -> Option<SessionHandle> {
        match self {
            Stage::Streaming { session, .. } => Some(*session),
            _ => None,
        }
    }

    pub(crate) fn request(&self) -> Option<&PreviewRequestSpec> {
        match self {
            Stage::SessionConfiguring { request, .. } | Stage::Streaming { request, .. } => {
                Some(request)
            }
            _ => None,
        }
    }
}
