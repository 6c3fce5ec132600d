//! Camera service abstraction.
//!
//! This module provides a trait-based abstraction over the platform camera
//! service, allowing for both real camera stacks and a simulated service
//! for tests and the demo binary.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::{
    CameraId, DeviceErrorCode, DeviceHandle, PlatformError, RequestToken, SessionHandle,
    SessionRequest,
};
use crate::capture::{CaptureResult, PreviewRequestSpec};
use crate::event::{DeviceEvent, PlatformEvent, SessionEvent};
use crate::event_loop::EventSender;

/// Trait for camera service implementations.
///
/// Requests return as soon as they are registered. Their outcome arrives
/// later as a [`PlatformEvent`] tagged with the request's token.
pub trait CameraService {
    /// API level of the camera stack.
    fn api_level(&self) -> u32;

    /// Enumerates the available camera identifiers.
    fn camera_ids(&self) -> Result<Vec<CameraId>, PlatformError>;

    /// Requests that a device be opened.
    fn open_camera(&mut self, id: &CameraId, token: RequestToken) -> Result<(), PlatformError>;

    /// Requests a capture session on an open device.
    fn create_session(
        &mut self,
        device: DeviceHandle,
        request: SessionRequest,
        token: RequestToken,
    ) -> Result<(), PlatformError>;

    /// Starts repeating `request` on a configured session.
    fn set_repeating_request(
        &mut self,
        session: SessionHandle,
        request: &PreviewRequestSpec,
        token: RequestToken,
    ) -> Result<(), PlatformError>;

    /// Closes a device. Its sessions and repeating requests die with it.
    fn close_device(&mut self, device: DeviceHandle);
}

/// Call counts recorded by [`SimulatedCamera`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SimulatedCameraStats {
    pub opens: u64,
    pub closes: u64,
    pub sessions: u64,
    pub repeating_requests: u64,
}

#[derive(Debug, Clone, Copy)]
struct Repeating {
    token: RequestToken,
    session: SessionHandle,
}

/// Simulated camera service.
///
/// Every request completes immediately by posting its outcome to the event
/// queue, so a single `dispatch_pending` drives a full open sequence.
pub struct SimulatedCamera {
    events: EventSender,
    api_level: u32,
    camera_count: u32,
    fail_access: bool,
    fail_configure: bool,
    frame_clock_fps: Option<u32>,
    next_handle: u64,
    device: Option<(RequestToken, DeviceHandle)>,
    repeating: Option<Repeating>,
    frame_clock_stop: Option<Arc<AtomicBool>>,
    frame_number: u64,
    last_session_request: Option<SessionRequest>,
    stats: SimulatedCameraStats,
}

impl SimulatedCamera {
    /// Creates a service with one camera at API level 34.
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            api_level: 34,
            camera_count: 1,
            fail_access: false,
            fail_configure: false,
            frame_clock_fps: None,
            next_handle: 0,
            device: None,
            repeating: None,
            frame_clock_stop: None,
            frame_number: 0,
            last_session_request: None,
            stats: SimulatedCameraStats::default(),
        }
    }

    pub fn with_api_level(mut self, api_level: u32) -> Self {
        self.api_level = api_level;
        self
    }

    pub fn with_camera_count(mut self, count: u32) -> Self {
        self.camera_count = count;
        self
    }

    /// Makes enumeration and open requests fail synchronously.
    pub fn with_access_failure(mut self, fail: bool) -> Self {
        self.fail_access = fail;
        self
    }

    /// Makes every session configuration fail.
    pub fn with_configure_failure(mut self, fail: bool) -> Self {
        self.fail_configure = fail;
        self
    }

    /// Posts frames at `fps` while a repeating request is active.
    ///
    /// The clock runs as a tokio task, so a runtime must be available.
    pub fn with_frame_clock(mut self, fps: u32) -> Self {
        self.frame_clock_fps = Some(fps.max(1));
        self
    }

    /// Returns recorded call counts.
    pub fn stats(&self) -> SimulatedCameraStats {
        self.stats
    }

    /// Returns true while a device is open.
    pub fn is_device_open(&self) -> bool {
        self.device.is_some()
    }

    /// Returns true while a repeating request is active.
    pub fn is_streaming(&self) -> bool {
        self.repeating.is_some()
    }

    /// Returns the session the repeating request runs on.
    pub fn active_session(&self) -> Option<SessionHandle> {
        self.repeating.map(|repeating| repeating.session)
    }

    /// Returns the most recent session request.
    pub fn last_session_request(&self) -> Option<&SessionRequest> {
        self.last_session_request.as_ref()
    }

    /// Posts a capture completion for the active repeating request.
    ///
    /// Returns false if nothing is streaming.
    pub fn emit_frame(&mut self, sensor_timestamp: i64) -> bool {
        let Some(repeating) = self.repeating else {
            return false;
        };
        self.frame_number += 1;
        self.events.send(PlatformEvent::CaptureCompleted(
            repeating.token,
            CaptureResult::new(self.frame_number, sensor_timestamp),
        ))
    }

    /// Simulates the open device being disconnected.
    pub fn disconnect(&mut self) -> bool {
        self.drop_device(DeviceEvent::Disconnected)
    }

    /// Simulates a fatal error on the open device.
    pub fn fail_device(&mut self, code: DeviceErrorCode) -> bool {
        self.drop_device(|device| DeviceEvent::Error(device, code))
    }

    fn drop_device(&mut self, event: impl FnOnce(DeviceHandle) -> DeviceEvent) -> bool {
        let Some((token, device)) = self.device.take() else {
            return false;
        };
        self.stop_streaming();
        self.events.send(PlatformEvent::Device(token, event(device)))
    }

    fn stop_streaming(&mut self) {
        self.repeating = None;
        if let Some(stop) = self.frame_clock_stop.take() {
            stop.store(true, Ordering::Relaxed);
        }
    }

    fn next_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn spawn_frame_clock(&mut self, fps: u32, token: RequestToken) {
        let stop = Arc::new(AtomicBool::new(false));
        self.frame_clock_stop = Some(Arc::clone(&stop));
        let events = self.events.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(1) / fps);
            let start = tokio::time::Instant::now();
            let mut frame_number = 0u64;
            loop {
                interval.tick().await;
                if stop.load(Ordering::Relaxed) {
                    break;
                }
                frame_number += 1;
                let timestamp = i64::try_from(start.elapsed().as_nanos()).unwrap_or(i64::MAX);
                let result = CaptureResult::new(frame_number, timestamp);
                if !events.send(PlatformEvent::CaptureCompleted(token, result)) {
                    break;
                }
            }
        });
    }
}

impl CameraService for SimulatedCamera {
    fn api_level(&self) -> u32 {
        self.api_level
    }

    fn camera_ids(&self) -> Result<Vec<CameraId>, PlatformError> {
        if self.fail_access {
            return Err(PlatformError::CameraAccess(
                "camera service unavailable".to_string(),
            ));
        }
        Ok((0..self.camera_count)
            .map(|i| CameraId(i.to_string()))
            .collect())
    }

    fn open_camera(&mut self, id: &CameraId, token: RequestToken) -> Result<(), PlatformError> {
        if self.fail_access {
            return Err(PlatformError::CameraAccess(format!("cannot open {}", id)));
        }
        let known = id
            .0
            .parse::<u32>()
            .map(|index| index < self.camera_count)
            .unwrap_or(false);
        if !known {
            return Err(PlatformError::UnknownCamera(id.clone()));
        }

        let device = DeviceHandle(self.next_handle());
        self.stop_streaming();
        self.device = Some((token, device));
        self.stats.opens += 1;
        tracing::debug!(camera = %id, ?device, ?token, "SimulatedCamera opened device");
        self.events
            .send(PlatformEvent::Device(token, DeviceEvent::Opened(device)));
        Ok(())
    }

    fn create_session(
        &mut self,
        device: DeviceHandle,
        request: SessionRequest,
        token: RequestToken,
    ) -> Result<(), PlatformError> {
        if self.device.map(|(_, open)| open) != Some(device) {
            return Err(PlatformError::CameraAccess(format!(
                "device {:?} is not open",
                device
            )));
        }
        self.stats.sessions += 1;
        self.last_session_request = Some(request);

        let outcome = if self.fail_configure {
            SessionEvent::ConfigureFailed
        } else {
            SessionEvent::Configured(SessionHandle(self.next_handle()))
        };
        self.events.send(PlatformEvent::Session(token, outcome));
        Ok(())
    }

    fn set_repeating_request(
        &mut self,
        session: SessionHandle,
        request: &PreviewRequestSpec,
        token: RequestToken,
    ) -> Result<(), PlatformError> {
        if self.device.is_none() {
            return Err(PlatformError::CameraAccess(
                "no open device for repeating request".to_string(),
            ));
        }
        self.stop_streaming();
        self.repeating = Some(Repeating { token, session });
        self.stats.repeating_requests += 1;
        tracing::debug!(?session, fps = request.fps_range().upper, "SimulatedCamera streaming");

        if let Some(fps) = self.frame_clock_fps {
            self.spawn_frame_clock(fps, token);
        }
        Ok(())
    }

    fn close_device(&mut self, device: DeviceHandle) {
        if self.device.map(|(_, open)| open) == Some(device) {
            self.device = None;
            self.stop_streaming();
        }
        self.stats.closes += 1;
        tracing::debug!(?device, "SimulatedCamera closed device");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::PreviewConfig;
    use crate::event::Event;
    use crate::event_loop::{EventHandler, EventLoop};
    use crate::platform::SurfaceHandle;

    #[derive(Default)]
    struct Collect(Vec<Event>);

    impl EventHandler for Collect {
        type Error = ();

        fn handle(&mut self, event: Event) -> Result<(), ()> {
            self.0.push(event);
            Ok(())
        }
    }

    fn drain(event_loop: &mut EventLoop) -> Vec<Event> {
        let mut collect = Collect::default();
        event_loop.dispatch_pending(&mut collect).unwrap();
        collect.0
    }

    #[test]
    fn test_simulated_camera_lifecycle() {
        let mut event_loop = EventLoop::new();
        let mut camera = SimulatedCamera::new(event_loop.sender());
        let token = RequestToken(1);

        let ids = camera.camera_ids().unwrap();
        assert_eq!(ids, vec![CameraId("0".to_string())]);

        camera.open_camera(&ids[0], token).unwrap();
        let events = drain(&mut event_loop);
        let device = match events.as_slice() {
            [Event::Platform(PlatformEvent::Device(t, DeviceEvent::Opened(device)))] => {
                assert_eq!(*t, token);
                *device
            }
            other => panic!("unexpected events: {:?}", other),
        };
        assert!(camera.is_device_open());

        let request = PreviewRequestSpec::preview(SurfaceHandle(1), &PreviewConfig::default());
        camera
            .create_session(device, SessionRequest::SurfaceList(vec![SurfaceHandle(1)]), token)
            .unwrap();
        let session = match drain(&mut event_loop).as_slice() {
            [Event::Platform(PlatformEvent::Session(_, SessionEvent::Configured(session)))] => {
                *session
            }
            other => panic!("unexpected events: {:?}", other),
        };

        camera.set_repeating_request(session, &request, token).unwrap();
        assert_eq!(camera.active_session(), Some(session));
        assert!(camera.emit_frame(100));
        assert_eq!(drain(&mut event_loop).len(), 1);

        camera.close_device(device);
        assert!(!camera.is_device_open());
        assert!(!camera.emit_frame(200));
        assert_eq!(
            camera.stats(),
            SimulatedCameraStats {
                opens: 1,
                closes: 1,
                sessions: 1,
                repeating_requests: 1,
            }
        );
    }

    #[test]
    fn test_access_failure() {
        let event_loop = EventLoop::new();
        let camera = SimulatedCamera::new(event_loop.sender()).with_access_failure(true);
        assert!(matches!(
            camera.camera_ids(),
            Err(PlatformError::CameraAccess(_))
        ));
    }

    #[test]
    fn test_unknown_camera_rejected() {
        let event_loop = EventLoop::new();
        let mut camera = SimulatedCamera::new(event_loop.sender());
        let result = camera.open_camera(&CameraId("7".to_string()), RequestToken(1));
        assert!(matches!(result, Err(PlatformError::UnknownCamera(_))));
    }

    #[test]
    fn test_session_on_closed_device_rejected() {
        let event_loop = EventLoop::new();
        let mut camera = SimulatedCamera::new(event_loop.sender());
        let result = camera.create_session(
            DeviceHandle(42),
            SessionRequest::SurfaceList(vec![SurfaceHandle(1)]),
            RequestToken(1),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_disconnect_posts_event() {
        let mut event_loop = EventLoop::new();
        let mut camera = SimulatedCamera::new(event_loop.sender());
        camera
            .open_camera(&CameraId("0".to_string()), RequestToken(4))
            .unwrap();
        drain(&mut event_loop);

        assert!(camera.disconnect());
        assert!(!camera.disconnect());
        match drain(&mut event_loop).as_slice() {
            [Event::Platform(PlatformEvent::Device(RequestToken(4), DeviceEvent::Disconnected(_)))] => {}
            other => panic!("unexpected events: {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_frame_clock_posts_frames() {
        let mut event_loop = EventLoop::new();
        let mut camera = SimulatedCamera::new(event_loop.sender()).with_frame_clock(30);
        let token = RequestToken(1);
        camera
            .open_camera(&CameraId("0".to_string()), token)
            .unwrap();
        let request = PreviewRequestSpec::preview(SurfaceHandle(1), &PreviewConfig::default());
        camera
            .set_repeating_request(SessionHandle(99), &request, token)
            .unwrap();

        tokio::time::sleep(Duration::from_millis(100)).await;
        let frames = drain(&mut event_loop)
            .into_iter()
            .filter(|e| matches!(e, Event::Platform(PlatformEvent::CaptureCompleted(..))))
            .count();
        assert!(frames >= 2, "expected frames, got {}", frames);
    }
}
