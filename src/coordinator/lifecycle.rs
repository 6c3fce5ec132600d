//! The camera lifecycle coordinator.

use super::state::{CameraState, RunSignals, Stage};
use super::CoordinatorError;
use crate::capture::{CaptureResult, FrameTimer, PreviewConfig, PreviewRequestSpec};
use crate::event::{DeviceEvent, PlatformEvent, SessionEvent};
use crate::metrics::PreviewMetrics;
use crate::platform::{
    CameraService, DeviceErrorCode, DeviceHandle, PlatformError, RequestToken, SessionHandle,
    SessionStrategy,
};

/// Opens and closes the camera to match the run signals.
///
/// Signal changes enter through [`update`](Self::update); platform
/// completions through [`handle_platform`](Self::handle_platform). Both
/// are called from the event loop, never concurrently.
pub struct CameraCoordinator<C: CameraService> {
    camera: C,
    config: PreviewConfig,
    strategy: SessionStrategy,
    signals: RunSignals,
    stage: Stage,
    last_token: RequestToken,
    timer: FrameTimer,
    metrics: PreviewMetrics,
}

impl<C: CameraService> CameraCoordinator<C> {
    /// Creates an idle coordinator.
    ///
    /// The session strategy is fixed here from the service's API level.
    pub fn new(camera: C, config: PreviewConfig, metrics: PreviewMetrics) -> Self {
        let strategy = SessionStrategy::for_api_level(camera.api_level());
        tracing::info!(
            api_level = camera.api_level(),
            ?strategy,
            width = config.width,
            height = config.height,
            fps = config.fps,
            "Camera coordinator created"
        );
        metrics.set_state(CameraState::Idle);

        Self {
            camera,
            config,
            strategy,
            signals: RunSignals::default(),
            stage: Stage::Idle,
            last_token: RequestToken(0),
            timer: FrameTimer::new(),
            metrics,
        }
    }

    /// Applies a change to the run signals and re-evaluates.
    pub fn update(&mut self, change: impl FnOnce(&mut RunSignals)) -> Result<(), CoordinatorError> {
        let before = self.signals;
        change(&mut self.signals);

        // A session renders into one surface; a replacement needs a new session.
        if before.surface.is_some()
            && self.signals.surface.is_some()
            && before.surface != self.signals.surface
            && self.stage != Stage::Idle
        {
            tracing::info!("Display surface replaced, restarting camera");
            self.teardown();
        }

        if before != self.signals {
            tracing::debug!(
                resumed = self.signals.app_resumed,
                permission = self.signals.has_permission,
                surface = self.signals.surface.is_some(),
                "Run signals changed"
            );
        }
        self.on_signal_changed()
    }

    /// Re-evaluates the run condition and opens or tears down to match.
    ///
    /// A no-op when the camera is already in the matching state.
    pub fn on_signal_changed(&mut self) -> Result<(), CoordinatorError> {
        let run = self.signals.should_run();
        let idle = self.stage == Stage::Idle;
        match (run, idle) {
            (true, true) => self.open_camera(),
            (false, true) | (true, false) => {
                tracing::trace!(run, state = %self.state(), "Camera already in target state");
                Ok(())
            }
            (false, false) => {
                self.teardown();
                Ok(())
            }
        }
    }

    /// Routes a camera service completion.
    pub fn handle_platform(&mut self, event: PlatformEvent) -> Result<(), CoordinatorError> {
        match event {
            PlatformEvent::Device(token, DeviceEvent::Opened(device)) => {
                self.on_device_opened(token, device)
            }
            PlatformEvent::Device(token, DeviceEvent::Disconnected(device)) => {
                self.on_device_lost(token, device, None);
                Ok(())
            }
            PlatformEvent::Device(token, DeviceEvent::Error(device, code)) => {
                self.on_device_lost(token, device, Some(code));
                Ok(())
            }
            PlatformEvent::Session(token, SessionEvent::Configured(session)) => {
                self.on_session_configured(token, session)
            }
            PlatformEvent::Session(token, SessionEvent::ConfigureFailed) => {
                self.on_session_configure_failed(token);
                Ok(())
            }
            PlatformEvent::CaptureCompleted(token, result) => {
                self.on_capture_completed(token, &result);
                Ok(())
            }
        }
    }

    /// Closes the device and drops device, session and request together.
    ///
    /// A pending open is abandoned; its device is closed when it arrives.
    pub fn teardown(&mut self) {
        let from = self.stage.state();
        let stage = std::mem::replace(&mut self.stage, Stage::Idle);
        match stage.device() {
            Some(device) => {
                self.camera.close_device(device);
                self.metrics.record_close();
                tracing::info!(?device, "Camera closed");
            }
            None if stage != Stage::Idle => {
                tracing::debug!(token = ?stage.token(), "Abandoning pending camera open");
            }
            None => {}
        }
        self.enter(from, Stage::Idle);
    }

    fn open_camera(&mut self) -> Result<(), CoordinatorError> {
        let ids = self
            .camera
            .camera_ids()
            .map_err(|source| access_error("enumerate cameras", source))?;
        let Some(id) = ids.into_iter().next() else {
            tracing::warn!("No cameras available");
            return Ok(());
        };

        let token = self.last_token.next();
        self.last_token = token;
        self.camera
            .open_camera(&id, token)
            .map_err(|source| access_error("open camera", source))?;

        self.metrics.record_open();
        tracing::info!(camera = %id, ?token, "Opening camera");
        self.set_stage(Stage::Opening { token });
        Ok(())
    }

    fn on_device_opened(
        &mut self,
        token: RequestToken,
        device: DeviceHandle,
    ) -> Result<(), CoordinatorError> {
        if self.stage != (Stage::Opening { token }) {
            self.discard_stale("device opened", token);
            self.camera.close_device(device);
            self.metrics.record_close();
            return Ok(());
        }

        tracing::info!(?device, "Camera device opened");
        self.create_session(token, device)
    }

    fn create_session(
        &mut self,
        token: RequestToken,
        device: DeviceHandle,
    ) -> Result<(), CoordinatorError> {
        let Some(surface) = self.signals.surface else {
            tracing::warn!("Display surface gone before session creation");
            self.camera.close_device(device);
            self.metrics.record_close();
            self.set_stage(Stage::Idle);
            return Ok(());
        };

        let request = PreviewRequestSpec::preview(surface, &self.config);
        let session_request = self.strategy.session_request(&request);
        self.set_stage(Stage::SessionConfiguring {
            token,
            device,
            request,
        });

        self.camera
            .create_session(device, session_request, token)
            .map_err(|source| access_error("create capture session", source))
    }

    fn on_session_configured(
        &mut self,
        token: RequestToken,
        session: SessionHandle,
    ) -> Result<(), CoordinatorError> {
        let from = self.stage.state();
        match std::mem::replace(&mut self.stage, Stage::Idle) {
            Stage::SessionConfiguring {
                token: current,
                device,
                request,
            } if current == token => {
                tracing::info!(?session, "Camera session configured");
                self.enter(
                    from,
                    Stage::Streaming {
                        token,
                        device,
                        session,
                        request,
                    },
                );
                self.start_repeating_request()
            }
            other => {
                self.stage = other;
                self.discard_stale("session configured", token);
                Ok(())
            }
        }
    }

    fn on_session_configure_failed(&mut self, token: RequestToken) {
        match self.stage {
            Stage::SessionConfiguring { token: current, .. } if current == token => {
                // No retry; the next signal change that stops the camera clears this.
                tracing::error!(?token, "Camera session configure failed");
                self.metrics.record_configure_failure();
            }
            _ => self.discard_stale("session configure failure", token),
        }
    }

    fn start_repeating_request(&mut self) -> Result<(), CoordinatorError> {
        let Stage::Streaming {
            token,
            session,
            request,
            ..
        } = &self.stage
        else {
            return Ok(());
        };
        self.camera
            .set_repeating_request(*session, request, *token)
            .map_err(|source| access_error("start repeating request", source))
    }

    fn on_capture_completed(&mut self, token: RequestToken, result: &CaptureResult) {
        match self.stage {
            Stage::Streaming { token: current, .. } if current == token => {
                let delta = self.timer.record(result);
                self.metrics.record_frame(delta);
                tracing::info!(
                    frame = result.frame_number(),
                    delta_ns = delta,
                    "Sensor timestamp delta: {}",
                    delta
                );
            }
            _ => {
                self.metrics.record_stale_completion();
                tracing::trace!(?token, "Discarding frame from a closed session");
            }
        }
    }

    fn on_device_lost(
        &mut self,
        token: RequestToken,
        device: DeviceHandle,
        code: Option<DeviceErrorCode>,
    ) {
        let ours = self.stage.token() == Some(token)
            && self.stage.device().map_or(true, |current| current == device);
        if !ours {
            self.discard_stale("device lost", token);
            return;
        }

        match code {
            None => {
                tracing::warn!(?device, "Camera device disconnected");
                self.metrics.record_disconnect();
            }
            Some(code) => {
                tracing::error!(?device, %code, "Camera device error");
                self.metrics.record_device_error();
            }
        }
        // The platform has already released the device. No reopen until
        // the next signal change.
        self.set_stage(Stage::Idle);
    }

    fn discard_stale(&self, what: &'static str, token: RequestToken) {
        self.metrics.record_stale_completion();
        tracing::debug!(what, ?token, current = ?self.stage.token(), "Discarding stale completion");
    }

    fn set_stage(&mut self, stage: Stage) {
        let from = self.stage.state();
        self.enter(from, stage);
    }

    /// Installs `stage`, logging the move from `from`. Callers that took
    /// the stage out with `mem::replace` pass the state it had before.
    fn enter(&mut self, from: CameraState, stage: Stage) {
        self.stage = stage;
        let to = self.stage.state();
        if from != to {
            tracing::debug!(%from, %to, "Camera state transition");
            self.metrics.record_transition(from, to);
        }
        self.metrics.set_state(to);
    }

    /// Current state.
    pub fn state(&self) -> CameraState {
        self.stage.state()
    }

    /// Current run signals.
    pub fn signals(&self) -> RunSignals {
        self.signals
    }

    /// Session strategy chosen at construction.
    pub fn strategy(&self) -> SessionStrategy {
        self.strategy
    }

    /// The open device, if any.
    pub fn device(&self) -> Option<DeviceHandle> {
        self.stage.device()
    }

    /// The configured session, if any.
    pub fn session(&self) -> Option<SessionHandle> {
        self.stage.session()
    }

    /// The preview request of the current session, if any.
    pub fn request(&self) -> Option<&PreviewRequestSpec> {
        self.stage.request()
    }

    pub fn frame_timer(&self) -> &FrameTimer {
        &self.timer
    }

    pub fn metrics(&self) -> &PreviewMetrics {
        &self.metrics
    }

    pub fn camera(&self) -> &C {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut C {
        &mut self.camera
    }
}

fn access_error(operation: &'static str, source: PlatformError) -> CoordinatorError {
    CoordinatorError::CameraAccess { operation, source }
}
