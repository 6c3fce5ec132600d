//! Desktop camera service backed by nokhwa.
//!
//! Desktop capture stacks have no display surfaces or capture sessions, so
//! session creation always succeeds and the repeating request simply starts
//! the stream. Each device runs on its own thread because a nokhwa camera
//! cannot move between threads.

use std::fmt;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    ApiBackend, CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType,
    Resolution,
};
use nokhwa::{query, Camera};

use super::{
    CameraId, CameraService, DeviceErrorCode, DeviceHandle, PlatformError, RequestToken,
    SessionHandle, SessionRequest,
};
use crate::capture::{
    CaptureResult, PreviewConfig, PreviewRequestSpec, SESSION_CONFIGURATION_MIN_API,
};
use crate::event::{DeviceEvent, PlatformEvent, SessionEvent};
use crate::event_loop::EventSender;

enum DeviceCommand {
    ConfigureSession(SessionHandle),
    StartStream,
    Close,
}

struct DeviceWorker {
    device: DeviceHandle,
    commands: Sender<DeviceCommand>,
    thread: JoinHandle<()>,
}

/// Camera service over the host's native capture API.
pub struct NokhwaCamera {
    events: EventSender,
    config: PreviewConfig,
    next_handle: u64,
    worker: Option<DeviceWorker>,
}

impl NokhwaCamera {
    pub fn new(events: EventSender, config: PreviewConfig) -> Self {
        Self {
            events,
            config,
            next_handle: 0,
            worker: None,
        }
    }

    fn next_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn send(&self, device: DeviceHandle, command: DeviceCommand) -> Result<(), PlatformError> {
        let worker = self
            .worker
            .as_ref()
            .filter(|worker| worker.device == device)
            .ok_or_else(|| PlatformError::CameraAccess(format!("device {:?} is not open", device)))?;
        worker
            .commands
            .send(command)
            .map_err(|_| PlatformError::Backend("device thread exited".to_string()))
    }

    fn stop_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.commands.send(DeviceCommand::Close);
            if worker.thread.join().is_err() {
                tracing::warn!(device = ?worker.device, "Device thread panicked");
            }
        }
    }
}

impl CameraService for NokhwaCamera {
    fn api_level(&self) -> u32 {
        SESSION_CONFIGURATION_MIN_API
    }

    fn camera_ids(&self) -> Result<Vec<CameraId>, PlatformError> {
        let devices =
            query(ApiBackend::Auto).map_err(|e| PlatformError::CameraAccess(e.to_string()))?;
        Ok(devices
            .into_iter()
            .map(|info| CameraId(info.index().to_string()))
            .collect())
    }

    fn open_camera(&mut self, id: &CameraId, token: RequestToken) -> Result<(), PlatformError> {
        self.stop_worker();

        let index = match id.0.parse::<u32>() {
            Ok(index) => CameraIndex::Index(index),
            Err(_) => CameraIndex::String(id.0.clone()),
        };
        let device = DeviceHandle(self.next_handle());
        let (commands, rx) = mpsc::channel();
        let events = self.events.clone();
        let config = self.config.clone();

        let thread = thread::Builder::new()
            .name(format!("camera-{}", id))
            .spawn(move || run_device(index, config, device, token, events, rx))
            .map_err(|e| PlatformError::Backend(e.to_string()))?;

        self.worker = Some(DeviceWorker {
            device,
            commands,
            thread,
        });
        Ok(())
    }

    fn create_session(
        &mut self,
        device: DeviceHandle,
        request: SessionRequest,
        _token: RequestToken,
    ) -> Result<(), PlatformError> {
        tracing::debug!(surfaces = request.surfaces().len(), "Desktop session requested");
        let session = SessionHandle(self.next_handle());
        self.send(device, DeviceCommand::ConfigureSession(session))
    }

    fn set_repeating_request(
        &mut self,
        session: SessionHandle,
        request: &PreviewRequestSpec,
        _token: RequestToken,
    ) -> Result<(), PlatformError> {
        let device = self
            .worker
            .as_ref()
            .map(|worker| worker.device)
            .ok_or_else(|| PlatformError::CameraAccess("no open device".to_string()))?;
        tracing::debug!(?session, fps = request.fps_range().upper, "Starting desktop stream");
        self.send(device, DeviceCommand::StartStream)
    }

    fn close_device(&mut self, device: DeviceHandle) {
        if self.worker.as_ref().map(|worker| worker.device) == Some(device) {
            self.stop_worker();
        }
    }
}

impl Drop for NokhwaCamera {
    fn drop(&mut self) {
        self.stop_worker();
    }
}

fn open_with_fallback(index: &CameraIndex, config: &PreviewConfig) -> Result<Camera, String> {
    let attempts = [
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            Resolution::new(config.width, config.height),
            FrameFormat::MJPEG,
            config.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestFrameRate),
    ];

    let mut last_error = String::from("no format attempted");
    for requested in attempts {
        match Camera::new(index.clone(), requested) {
            Ok(camera) => return Ok(camera),
            Err(e) => last_error = e.to_string(),
        }
    }
    Err(last_error)
}

/// Maps one frame read to the event posted for it. A failed read means the
/// stream is gone; the device is reported lost and the thread stops.
fn frame_event<B, E: fmt::Display>(
    frame: Result<B, E>,
    frame_number: u64,
    elapsed: Duration,
    device: DeviceHandle,
    token: RequestToken,
) -> PlatformEvent {
    match frame {
        Ok(_buffer) => {
            let timestamp = i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX);
            PlatformEvent::CaptureCompleted(token, CaptureResult::new(frame_number, timestamp))
        }
        Err(e) => {
            tracing::warn!(?device, error = %e, "Desktop frame read failed");
            PlatformEvent::Device(token, DeviceEvent::Disconnected(device))
        }
    }
}

fn run_device(
    index: CameraIndex,
    config: PreviewConfig,
    device: DeviceHandle,
    token: RequestToken,
    events: EventSender,
    commands: Receiver<DeviceCommand>,
) {
    let mut camera = match open_with_fallback(&index, &config) {
        Ok(camera) => camera,
        Err(e) => {
            tracing::error!(error = %e, "Failed to open desktop camera");
            events.send(PlatformEvent::Device(
                token,
                DeviceEvent::Error(device, DeviceErrorCode::CameraDevice),
            ));
            return;
        }
    };
    events.send(PlatformEvent::Device(token, DeviceEvent::Opened(device)));

    let mut streaming = false;
    let mut frame_number = 0u64;
    let opened_at = Instant::now();

    loop {
        let command = if streaming {
            match commands.try_recv() {
                Ok(command) => Some(command),
                Err(TryRecvError::Empty) => None,
                Err(TryRecvError::Disconnected) => break,
            }
        } else {
            match commands.recv() {
                Ok(command) => Some(command),
                Err(_) => break,
            }
        };

        match command {
            Some(DeviceCommand::ConfigureSession(session)) => {
                events.send(PlatformEvent::Session(token, SessionEvent::Configured(session)));
            }
            Some(DeviceCommand::StartStream) if !streaming => match camera.open_stream() {
                Ok(()) => streaming = true,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to start desktop stream");
                    events.send(PlatformEvent::Device(
                        token,
                        DeviceEvent::Error(device, DeviceErrorCode::CameraDevice),
                    ));
                    return;
                }
            },
            Some(DeviceCommand::StartStream) => {}
            Some(DeviceCommand::Close) => break,
            None => {}
        }

        if streaming {
            let elapsed = opened_at.elapsed();
            match frame_event(camera.frame(), frame_number + 1, elapsed, device, token) {
                event @ PlatformEvent::CaptureCompleted(..) => {
                    frame_number += 1;
                    if !events.send(event) {
                        break;
                    }
                }
                event => {
                    events.send(event);
                    break;
                }
            }
        }
    }

    if streaming {
        if let Err(e) = camera.stop_stream() {
            tracing::warn!(?device, error = %e, "Failed to stop desktop stream");
        }
    }
    tracing::debug!(?device, "Desktop camera thread finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_read_posts_capture_result() {
        let event = frame_event::<(), &str>(
            Ok(()),
            3,
            Duration::from_millis(100),
            DeviceHandle(1),
            RequestToken(2),
        );
        assert_eq!(
            event,
            PlatformEvent::CaptureCompleted(RequestToken(2), CaptureResult::new(3, 100_000_000))
        );
    }

    #[test]
    fn test_failed_frame_read_reports_disconnect() {
        let event = frame_event::<(), &str>(
            Err("device unplugged"),
            3,
            Duration::from_millis(100),
            DeviceHandle(1),
            RequestToken(2),
        );
        assert_eq!(
            event,
            PlatformEvent::Device(RequestToken(2), DeviceEvent::Disconnected(DeviceHandle(1)))
        );
    }
}
