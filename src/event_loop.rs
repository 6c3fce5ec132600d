//! Single-threaded event loop.
//!
//! Platform services post completions through an [`EventSender`]; the loop
//! hands them to one [`EventHandler`] strictly in arrival order. Handlers
//! never run concurrently, so the state they own needs no locking.

use tokio::sync::mpsc;

use crate::event::Event;

/// Consumer of loop events.
pub trait EventHandler {
    type Error;

    /// Handles one event. An error stops the loop.
    fn handle(&mut self, event: Event) -> Result<(), Self::Error>;
}

/// Cloneable handle for posting events to the loop.
#[derive(Debug, Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<Event>,
}

impl EventSender {
    /// Posts an event. Returns false if the loop is gone.
    pub fn send(&self, event: impl Into<Event>) -> bool {
        self.tx.send(event.into()).is_ok()
    }
}

/// Why [`EventLoop::dispatch_pending`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopStatus {
    /// The queue is empty.
    Idle,
    /// A shutdown event was dequeued.
    Shutdown,
}

/// Owner of the event queue.
pub struct EventLoop {
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl EventLoop {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx }
    }

    /// Returns a sender for posting events.
    pub fn sender(&self) -> EventSender {
        EventSender {
            tx: self.tx.clone(),
        }
    }

    /// Handles every queued event without waiting for new ones.
    ///
    /// Events posted by the handler while dispatching are handled in the
    /// same call.
    pub fn dispatch_pending<H: EventHandler>(
        &mut self,
        handler: &mut H,
    ) -> Result<LoopStatus, H::Error> {
        while let Ok(event) = self.rx.try_recv() {
            if event == Event::Shutdown {
                return Ok(LoopStatus::Shutdown);
            }
            handler.handle(event)?;
        }
        Ok(LoopStatus::Idle)
    }

    /// Handles events until a shutdown event arrives.
    pub async fn run<H: EventHandler>(&mut self, handler: &mut H) -> Result<(), H::Error> {
        while let Some(event) = self.rx.recv().await {
            if event == Event::Shutdown {
                tracing::info!("Event loop shutting down");
                break;
            }
            handler.handle(event)?;
        }
        Ok(())
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{LifecycleEvent, SurfaceEvent};

    #[derive(Default)]
    struct Recorder {
        seen: Vec<Event>,
        fail_on: Option<Event>,
    }

    impl EventHandler for Recorder {
        type Error = String;

        fn handle(&mut self, event: Event) -> Result<(), String> {
            if self.fail_on == Some(event) {
                return Err(format!("failed on {:?}", event));
            }
            self.seen.push(event);
            Ok(())
        }
    }

    #[test]
    fn test_dispatch_preserves_arrival_order() {
        let mut event_loop = EventLoop::new();
        let sender = event_loop.sender();
        sender.send(LifecycleEvent::Resumed);
        sender.send(SurfaceEvent::Destroyed);
        sender.send(LifecycleEvent::Paused);

        let mut recorder = Recorder::default();
        let status = event_loop.dispatch_pending(&mut recorder).unwrap();

        assert_eq!(status, LoopStatus::Idle);
        assert_eq!(
            recorder.seen,
            vec![
                Event::Lifecycle(LifecycleEvent::Resumed),
                Event::Surface(SurfaceEvent::Destroyed),
                Event::Lifecycle(LifecycleEvent::Paused),
            ]
        );
    }

    #[test]
    fn test_shutdown_stops_dispatch() {
        let mut event_loop = EventLoop::new();
        let sender = event_loop.sender();
        sender.send(LifecycleEvent::Resumed);
        sender.send(Event::Shutdown);
        sender.send(LifecycleEvent::Paused);

        let mut recorder = Recorder::default();
        assert_eq!(
            event_loop.dispatch_pending(&mut recorder).unwrap(),
            LoopStatus::Shutdown
        );
        assert_eq!(recorder.seen.len(), 1);
    }

    #[test]
    fn test_handler_error_propagates() {
        let mut event_loop = EventLoop::new();
        event_loop.sender().send(LifecycleEvent::Paused);

        let mut recorder = Recorder {
            fail_on: Some(Event::Lifecycle(LifecycleEvent::Paused)),
            ..Default::default()
        };
        assert!(event_loop.dispatch_pending(&mut recorder).is_err());
    }

    #[tokio::test]
    async fn test_run_until_shutdown() {
        let mut event_loop = EventLoop::new();
        let sender = event_loop.sender();
        sender.send(LifecycleEvent::Resumed);
        sender.send(Event::Shutdown);

        let mut recorder = Recorder::default();
        event_loop.run(&mut recorder).await.unwrap();
        assert_eq!(recorder.seen, vec![Event::Lifecycle(LifecycleEvent::Resumed)]);
    }
}
