//! Events delivered to the preview's event loop.
//!
//! Every external signal (lifecycle, permission, surface) and every
//! platform completion (device, session, capture) is a message. Messages
//! are processed one at a time in arrival order.

use crate::capture::CaptureResult;
use crate::platform::{DeviceErrorCode, DeviceHandle, RequestToken, SessionHandle, SurfaceHandle};

/// Foreground state changes of the hosting activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleEvent {
    Resumed,
    Paused,
}

/// Display surface notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    Created(SurfaceHandle),
    Changed { format: i32, width: u32, height: u32 },
    Destroyed,
}

/// Outcome of an open request, or a later state change of the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    Opened(DeviceHandle),
    Disconnected(DeviceHandle),
    Error(DeviceHandle, DeviceErrorCode),
}

/// Outcome of a session creation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Configured(SessionHandle),
    ConfigureFailed,
}

/// Completions produced by the camera service.
///
/// Each carries the token of the open request it descends from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformEvent {
    Device(RequestToken, DeviceEvent),
    Session(RequestToken, SessionEvent),
    CaptureCompleted(RequestToken, CaptureResult),
}

/// A message for the event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Lifecycle(LifecycleEvent),
    /// The OS permission prompt returned.
    PermissionResult,
    /// The user pressed the permission prompt's button.
    PermissionButtonPressed,
    Surface(SurfaceEvent),
    Platform(PlatformEvent),
    Shutdown,
}

impl From<LifecycleEvent> for Event {
    fn from(event: LifecycleEvent) -> Self {
        Event::Lifecycle(event)
    }
}

impl From<SurfaceEvent> for Event {
    fn from(event: SurfaceEvent) -> Self {
        Event::Surface(event)
    }
}

impl From<PlatformEvent> for Event {
    fn from(event: PlatformEvent) -> Self {
        Event::Platform(event)
    }
}
