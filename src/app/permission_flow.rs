//! Camera permission prompt flow.
//!
//! The permission is requested automatically on the first resume. After
//! that the user drives it: a denial shows a prompt whose button either
//! asks again or, once the user chose "don't ask again", opens the app
//! settings.

use crate::platform::PermissionService;

/// What the permission area of the screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionView {
    /// Permission granted; the preview surface is visible.
    Preview,
    /// Not granted and never requested; nothing is shown yet.
    Hidden,
    /// Denied; the button asks again.
    RequestPrompt,
    /// Denied permanently; the button opens the app settings.
    SettingsPrompt,
}

/// Tracks the permission state and the prompt the user sees.
pub struct PermissionFlow<P: PermissionService> {
    service: P,
    granted: bool,
    has_requested: bool,
    view: PermissionView,
}

impl<P: PermissionService> PermissionFlow<P> {
    pub fn new(service: P) -> Self {
        Self {
            service,
            granted: false,
            has_requested: false,
            view: PermissionView::Hidden,
        }
    }

    /// Re-queries the permission and recomputes the view.
    ///
    /// Returns whether the permission is granted.
    pub fn refresh(&mut self) -> bool {
        self.granted = self.service.has_camera_permission();
        self.view = if self.granted {
            PermissionView::Preview
        } else if !self.has_requested {
            PermissionView::Hidden
        } else if self.service.should_show_rationale() {
            PermissionView::RequestPrompt
        } else {
            PermissionView::SettingsPrompt
        };
        self.granted
    }

    /// Shows the OS prompt if the permission is missing and was never
    /// requested.
    pub fn request_if_first(&mut self) {
        if !self.granted && !self.has_requested {
            tracing::info!("Requesting camera permission");
            self.service.request_camera_permission();
            self.has_requested = true;
        }
    }

    /// Performs the action of the prompt button currently shown.
    pub fn on_button_pressed(&mut self) {
        match self.view {
            PermissionView::RequestPrompt => {
                tracing::info!("Requesting camera permission again");
                self.service.request_camera_permission();
            }
            PermissionView::SettingsPrompt => {
                tracing::info!("Opening app settings for camera permission");
                self.service.open_settings();
            }
            PermissionView::Preview | PermissionView::Hidden => {
                tracing::debug!(view = ?self.view, "No permission button shown");
            }
        }
    }

    pub fn view(&self) -> PermissionView {
        self.view
    }

    pub fn has_requested(&self) -> bool {
        self.has_requested
    }
}
