//! Camera2 Preview Library
//!
//! Opens the device's primary camera, streams a fixed 640×480, 30 fps
//! preview into a display surface and logs the delta between consecutive
//! sensor timestamps.
//!
//! # Architecture
//!
//! Every input is a message on one event loop:
//!
//! ```text
//! lifecycle ─┐
//! permission ├─→ event loop → PreviewApp → CameraCoordinator → CameraService
//! surface ───┤                                                     │
//! platform ←─┴─────────────────── completions ←────────────────────┘
//! ```
//!
//! The coordinator keeps the camera open exactly while the app is
//! resumed, the permission is granted and the surface exists.
//!
//! # Example
//!
//! ```no_run
//! use camera2_preview::{
//!     app::PreviewApp,
//!     capture::PreviewConfig,
//!     event::{LifecycleEvent, SurfaceEvent},
//!     event_loop::EventLoop,
//!     metrics::PreviewMetrics,
//!     platform::{SimulatedCamera, SimulatedPermissions, SurfaceHandle},
//! };
//!
//! let mut event_loop = EventLoop::new();
//! let sender = event_loop.sender();
//! let mut app = PreviewApp::new(
//!     SimulatedCamera::new(event_loop.sender()),
//!     SimulatedPermissions::new(true),
//!     PreviewConfig::default(),
//!     PreviewMetrics::new().unwrap(),
//! );
//!
//! sender.send(SurfaceEvent::Created(SurfaceHandle(1)));
//! sender.send(LifecycleEvent::Resumed);
//! event_loop.dispatch_pending(&mut app).unwrap();
//! ```

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod app;
pub mod capture;
pub mod coordinator;
pub mod event;
pub mod event_loop;
pub mod metrics;
pub mod platform;
pub mod script;

// Re-export commonly used types at crate root
pub use app::{PermissionView, PreviewApp};
pub use capture::{CaptureResult, FileConfig, FrameTimer, PreviewConfig, PreviewRequestSpec};
pub use coordinator::{CameraCoordinator, CameraState, CoordinatorError, RunSignals};
pub use event::Event;
pub use event_loop::{EventLoop, EventSender};
pub use platform::{CameraService, PermissionService, SimulatedCamera, SimulatedPermissions};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
