//! Permission service abstraction.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// Access to the platform's runtime permission system, for the camera
/// capability only.
pub trait PermissionService {
    /// Whether the camera permission is currently granted.
    fn has_camera_permission(&self) -> bool;

    /// Shows the OS permission prompt. The answer arrives later as a
    /// permission-result event.
    fn request_camera_permission(&mut self);

    /// Whether the OS recommends explaining the request before asking again.
    /// False after the user chose "don't ask again".
    fn should_show_rationale(&self) -> bool;

    /// Opens the app's settings page so the user can grant manually.
    fn open_settings(&mut self);
}

#[derive(Debug, Default)]
struct PermissionState {
    granted: AtomicBool,
    permanently_denied: AtomicBool,
    requests: AtomicU32,
    settings_opened: AtomicU32,
}

/// Simulated permission service.
///
/// Clones share state, so a driver can flip the grant while the preview
/// owns another clone.
#[derive(Debug, Clone, Default)]
pub struct SimulatedPermissions {
    state: Arc<PermissionState>,
}

impl SimulatedPermissions {
    pub fn new(granted: bool) -> Self {
        let permissions = Self::default();
        permissions.set_granted(granted);
        permissions
    }

    /// Sets the grant state, as if the user answered a prompt.
    pub fn set_granted(&self, granted: bool) {
        self.state.granted.store(granted, Ordering::SeqCst);
    }

    /// Marks the permission as denied with "don't ask again".
    pub fn set_permanently_denied(&self, denied: bool) {
        self.state.permanently_denied.store(denied, Ordering::SeqCst);
    }

    /// Number of OS prompts shown.
    pub fn requests(&self) -> u32 {
        self.state.requests.load(Ordering::SeqCst)
    }

    /// Number of times the settings page was opened.
    pub fn settings_opened(&self) -> u32 {
        self.state.settings_opened.load(Ordering::SeqCst)
    }
}

impl PermissionService for SimulatedPermissions {
    fn has_camera_permission(&self) -> bool {
        self.state.granted.load(Ordering::SeqCst)
    }

    fn request_camera_permission(&mut self) {
        self.state.requests.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("Camera permission prompt shown");
    }

    fn should_show_rationale(&self) -> bool {
        !self.has_camera_permission() && !self.state.permanently_denied.load(Ordering::SeqCst)
    }

    fn open_settings(&mut self) {
        self.state.settings_opened.fetch_add(1, Ordering::SeqCst);
        tracing::debug!("App settings opened");
    }
}
