//! External collaborators: camera service, permission service, display
//! surface.
//!
//! The preview never owns these services. It talks to them through the
//! traits below, and they answer asynchronously by posting
//! [`PlatformEvent`](crate::event::PlatformEvent)s to the event loop.

mod camera;
#[cfg(feature = "camera")]
mod desktop;
mod permission;
mod session;

use std::fmt;
use thiserror::Error;

pub use camera::{CameraService, SimulatedCamera, SimulatedCameraStats};
#[cfg(feature = "camera")]
pub use desktop::NokhwaCamera;
pub use permission::{PermissionService, SimulatedPermissions};
pub use session::{
    OutputConfiguration, SessionConfiguration, SessionRequest, SessionStrategy, SessionType,
};

/// Errors reported synchronously by a platform service.
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    #[error("camera access failed: {0}")]
    CameraAccess(String),
    #[error("unknown camera: {0}")]
    UnknownCamera(CameraId),
    #[error("camera backend error: {0}")]
    Backend(String),
}

/// Identifier of a camera as enumerated by the camera service.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CameraId(pub String);

impl fmt::Display for CameraId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque handle of an opened camera device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DeviceHandle(pub u64);

/// Opaque handle of a configured capture session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionHandle(pub u64);

/// Opaque handle of a native display surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SurfaceHandle(pub u64);

/// Generation number of an open request.
///
/// Every completion carries the token of the open request it descends
/// from, so completions that outlive a teardown can be recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

impl RequestToken {
    /// Returns the token following this one.
    pub fn next(self) -> Self {
        RequestToken(self.0 + 1)
    }
}

/// Device error codes reported after a device has been opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceErrorCode {
    CameraInUse,
    MaxCamerasInUse,
    CameraDisabled,
    CameraDevice,
    CameraService,
}

impl DeviceErrorCode {
    /// Numeric code as used by the Android camera stack.
    pub fn code(self) -> i32 {
        match self {
            DeviceErrorCode::CameraInUse => 1,
            DeviceErrorCode::MaxCamerasInUse => 2,
            DeviceErrorCode::CameraDisabled => 3,
            DeviceErrorCode::CameraDevice => 4,
            DeviceErrorCode::CameraService => 5,
        }
    }
}

impl fmt::Display for DeviceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

/// Fixed size requested from the display surface provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSpec {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSpec {
    pub fn from_config(config: &crate::capture::PreviewConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
        }
    }
}
