//! The preview activity.
//!
//! Receives lifecycle, permission and surface events, keeps the permission
//! prompt up to date and forwards signal changes to the coordinator.

use super::permission_flow::{PermissionFlow, PermissionView};
use crate::capture::PreviewConfig;
use crate::coordinator::{CameraCoordinator, CoordinatorError};
use crate::event::{Event, LifecycleEvent, SurfaceEvent};
use crate::event_loop::EventHandler;
use crate::metrics::PreviewMetrics;
use crate::platform::{CameraService, PermissionService, SurfaceSpec};

/// Application shell around the camera coordinator.
pub struct PreviewApp<C: CameraService, P: PermissionService> {
    coordinator: CameraCoordinator<C>,
    permissions: PermissionFlow<P>,
    surface_spec: SurfaceSpec,
}

impl<C: CameraService, P: PermissionService> PreviewApp<C, P> {
    pub fn new(camera: C, permissions: P, config: PreviewConfig, metrics: PreviewMetrics) -> Self {
        let surface_spec = SurfaceSpec::from_config(&config);
        tracing::info!(
            width = surface_spec.width,
            height = surface_spec.height,
            "Requesting fixed-size preview surface"
        );
        Self {
            coordinator: CameraCoordinator::new(camera, config, metrics),
            permissions: PermissionFlow::new(permissions),
            surface_spec,
        }
    }

    fn on_lifecycle(&mut self, event: LifecycleEvent) -> Result<(), CoordinatorError> {
        match event {
            LifecycleEvent::Resumed => {
                let granted = self.permissions.refresh();
                self.coordinator.update(|signals| {
                    signals.app_resumed = true;
                    signals.has_permission = granted;
                })?;
                self.permissions.request_if_first();
                Ok(())
            }
            LifecycleEvent::Paused => self.coordinator.update(|signals| signals.app_resumed = false),
        }
    }

    fn on_surface(&mut self, event: SurfaceEvent) -> Result<(), CoordinatorError> {
        match event {
            SurfaceEvent::Created(surface) => {
                tracing::info!(?surface, "Surface created");
                self.coordinator.update(|signals| signals.surface = Some(surface))
            }
            SurfaceEvent::Changed {
                format,
                width,
                height,
            } => {
                tracing::info!(format, width, height, "Surface changed");
                if (width, height) != (self.surface_spec.width, self.surface_spec.height) {
                    tracing::warn!(
                        expected_width = self.surface_spec.width,
                        expected_height = self.surface_spec.height,
                        "Surface size differs from the requested fixed size"
                    );
                }
                Ok(())
            }
            SurfaceEvent::Destroyed => {
                tracing::info!("Surface destroyed");
                self.coordinator.update(|signals| signals.surface = None)
            }
        }
    }

    /// Releases the camera.
    pub fn shutdown(&mut self) {
        self.coordinator.teardown();
    }

    pub fn coordinator(&self) -> &CameraCoordinator<C> {
        &self.coordinator
    }

    pub fn coordinator_mut(&mut self) -> &mut CameraCoordinator<C> {
        &mut self.coordinator
    }

    pub fn permission_view(&self) -> PermissionView {
        self.permissions.view()
    }
}

impl<C: CameraService, P: PermissionService> EventHandler for PreviewApp<C, P> {
    type Error = CoordinatorError;

    fn handle(&mut self, event: Event) -> Result<(), CoordinatorError> {
        match event {
            Event::Lifecycle(event) => self.on_lifecycle(event),
            Event::PermissionResult => {
                let granted = self.permissions.refresh();
                tracing::info!(granted, "Camera permission result");
                self.coordinator
                    .update(|signals| signals.has_permission = granted)
            }
            Event::PermissionButtonPressed => {
                self.permissions.on_button_pressed();
                Ok(())
            }
            Event::Surface(event) => self.on_surface(event),
            Event::Platform(event) => self.coordinator.handle_platform(event),
            Event::Shutdown => {
                self.shutdown();
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinator::CameraState;
    use crate::event_loop::{EventLoop, EventSender};
    use crate::platform::{SimulatedCamera, SimulatedPermissions, SurfaceHandle};

    struct Harness {
        event_loop: EventLoop,
        sender: EventSender,
        permissions: SimulatedPermissions,
        app: PreviewApp<SimulatedCamera, SimulatedPermissions>,
    }

    impl Harness {
        fn new(granted: bool) -> Self {
            let event_loop = EventLoop::new();
            let sender = event_loop.sender();
            let permissions = SimulatedPermissions::new(granted);
            let app = PreviewApp::new(
                SimulatedCamera::new(event_loop.sender()),
                permissions.clone(),
                PreviewConfig::default(),
                PreviewMetrics::new().unwrap(),
            );
            Self {
                event_loop,
                sender,
                permissions,
                app,
            }
        }

        fn send(&mut self, event: impl Into<Event>) {
            self.sender.send(event);
            self.event_loop.dispatch_pending(&mut self.app).unwrap();
        }

        fn answer_prompt(&mut self, granted: bool) {
            self.permissions.set_granted(granted);
            self.send(Event::PermissionResult);
        }

        fn opens_closes(&self) -> (u64, u64) {
            let stats = self.app.coordinator().camera().stats();
            (stats.opens, stats.closes)
        }

        fn state(&self) -> CameraState {
            self.app.coordinator().state()
        }
    }

    #[test]
    fn test_deny_grant_pause_resume() {
        let mut harness = Harness::new(false);
        harness.send(SurfaceEvent::Created(SurfaceHandle(1)));
        harness.send(LifecycleEvent::Resumed);
        assert_eq!(harness.permissions.requests(), 1);
        assert_eq!(harness.state(), CameraState::Idle);

        harness.answer_prompt(false);
        assert_eq!(harness.app.permission_view(), PermissionView::RequestPrompt);
        assert_eq!(harness.opens_closes(), (0, 0));

        harness.answer_prompt(true);
        assert_eq!(harness.app.permission_view(), PermissionView::Preview);
        assert_eq!(harness.state(), CameraState::Streaming);

        harness.send(LifecycleEvent::Paused);
        assert_eq!(harness.opens_closes(), (1, 1));
        assert_eq!(harness.state(), CameraState::Idle);

        harness.send(LifecycleEvent::Resumed);
        assert_eq!(harness.state(), CameraState::Streaming);
        assert_eq!(harness.opens_closes(), (2, 1));
        assert_eq!(harness.permissions.requests(), 1);
    }

    #[test]
    fn test_granted_on_resume_streams_without_prompt() {
        let mut harness = Harness::new(true);
        harness.send(LifecycleEvent::Resumed);
        assert_eq!(harness.state(), CameraState::Idle);

        harness.send(SurfaceEvent::Created(SurfaceHandle(5)));
        assert_eq!(harness.state(), CameraState::Streaming);
        assert_eq!(harness.permissions.requests(), 0);
        assert_eq!(
            harness.app.coordinator().request().unwrap().target(),
            SurfaceHandle(5)
        );
    }

    #[test]
    fn test_surface_destroyed_while_streaming_closes_camera() {
        let mut harness = Harness::new(true);
        harness.send(SurfaceEvent::Created(SurfaceHandle(1)));
        harness.send(LifecycleEvent::Resumed);
        assert!(harness.app.coordinator_mut().camera_mut().emit_frame(1000));

        // The queued frame is handled before the surface goes away.
        harness.sender.send(SurfaceEvent::Destroyed);
        harness.event_loop.dispatch_pending(&mut harness.app).unwrap();
        assert!(!harness.app.coordinator_mut().camera_mut().emit_frame(2000));

        assert_eq!(harness.state(), CameraState::Idle);
        assert_eq!(harness.app.coordinator().metrics().frames(), 1);
        assert_eq!(harness.opens_closes(), (1, 1));
    }

    #[test]
    fn test_surface_changed_does_not_affect_camera() {
        let mut harness = Harness::new(true);
        harness.send(SurfaceEvent::Created(SurfaceHandle(1)));
        harness.send(LifecycleEvent::Resumed);

        harness.send(SurfaceEvent::Changed {
            format: 4,
            width: 640,
            height: 480,
        });

        assert_eq!(harness.state(), CameraState::Streaming);
        assert_eq!(harness.opens_closes(), (1, 0));
    }

    #[test]
    fn test_button_opens_settings_after_permanent_denial() {
        let mut harness = Harness::new(false);
        harness.send(LifecycleEvent::Resumed);
        harness.permissions.set_permanently_denied(true);
        harness.answer_prompt(false);

        assert_eq!(harness.app.permission_view(), PermissionView::SettingsPrompt);
        harness.send(Event::PermissionButtonPressed);
        assert_eq!(harness.permissions.settings_opened(), 1);

        // Granted in settings, picked up on the next resume.
        harness.permissions.set_granted(true);
        harness.send(LifecycleEvent::Paused);
        harness.send(SurfaceEvent::Created(SurfaceHandle(1)));
        harness.send(LifecycleEvent::Resumed);
        assert_eq!(harness.app.permission_view(), PermissionView::Preview);
        assert_eq!(harness.state(), CameraState::Streaming);
    }

    #[test]
    fn test_revoked_permission_stops_camera() {
        let mut harness = Harness::new(true);
        harness.send(SurfaceEvent::Created(SurfaceHandle(1)));
        harness.send(LifecycleEvent::Resumed);

        harness.answer_prompt(false);

        assert_eq!(harness.state(), CameraState::Idle);
        assert!(!harness.app.coordinator().camera().is_device_open());
    }
}
