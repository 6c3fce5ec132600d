//! Camera lifecycle coordination.
//!
//! Keeps the camera device and capture session open exactly while the app
//! is resumed, the camera permission is granted and a display surface
//! exists.
//!
//! ```text
//! Idle → Opening → SessionConfiguring → Streaming
//!   ↑________________________|______________|
//!        teardown / device error / disconnect
//! ```

mod lifecycle;
mod state;

use thiserror::Error;

use crate::platform::PlatformError;

pub use lifecycle::CameraCoordinator;
pub use state::{CameraState, RunSignals};

/// Unrecoverable coordinator failures.
#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("failed to {operation}: {source}")]
    CameraAccess {
        operation: &'static str,
        #[source]
        source: PlatformError,
    },
}
