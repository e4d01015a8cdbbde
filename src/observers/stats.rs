//! # Stats observer: "report ready" callbacks → events.
//!
//! The engine delivers statistics reports asynchronously from its worker
//! threads. Collection and interpretation are out of scope; this adapter only
//! carries the finished report across the thread boundary as an opaque
//! payload.
//!
//! Kind values sit in the `0x500` range.

use std::sync::Arc;

use crate::emitter::EventEmitter;
use crate::events::Event;
use crate::observers::target::ObserverTarget;

/// Event kinds produced by [`StatsObserver`].
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsEventKind {
    /// Payload: `String` (serialized report, opaque to the bridge).
    ReportReady = 0x500,
}

/// Adapter for the engine's one-shot stats callback.
pub struct StatsObserver {
    target: ObserverTarget,
}

impl StatsObserver {
    /// Creates an observer reporting into `emitter`.
    pub fn new(emitter: EventEmitter) -> Arc<Self> {
        Arc::new(Self {
            target: ObserverTarget::new(emitter),
        })
    }

    /// Rebinds or detaches the observer; `None` silences all later callbacks.
    pub fn set_emitter(&self, emitter: Option<EventEmitter>) {
        self.target.set_emitter(emitter);
    }

    pub fn on_report_ready(&self, report: String) {
        self.target
            .emit(Event::with_payload(StatsEventKind::ReportReady as u32, report));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EventLoop, LoopConfig};
    use crate::emitter::Handler;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Collect {
        seen: Mutex<Vec<Event>>,
    }

    #[async_trait]
    impl Handler for Collect {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.clone());
        }
    }

    #[tokio::test]
    async fn test_report_crosses_as_opaque_payload() {
        let event_loop = EventLoop::new(LoopConfig::default());
        let collect = Arc::new(Collect {
            seen: Mutex::new(Vec::new()),
        });
        let emitter = EventEmitter::new(&event_loop.handle(), "stats", collect.clone());
        let observer = StatsObserver::new(emitter.clone());

        observer.on_report_ready("{\"bytesSent\":1024}".into());
        emitter.dispatch_events().await;

        let seen = collect.seen.lock().unwrap();
        assert_eq!(seen[0].kind(), StatsEventKind::ReportReady as u32);
        assert!(seen[0].payload::<String>().unwrap().contains("bytesSent"));
    }
}
