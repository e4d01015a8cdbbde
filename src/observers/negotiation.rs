//! # Negotiation observer: offer/answer callbacks → events.
//!
//! The engine reports negotiation results (offer/answer created, local/remote
//! description applied) through one-shot callback interfaces. This adapter
//! turns each result into a single event; failures are ordinary events with a
//! failure kind and a message payload, never bridge errors.
//!
//! ## The forwarder pattern
//! A negotiation observer is usually bound to a *forwarder* emitter built over
//! the owning connection's emitter, so negotiation results surface on the
//! connection's own stream without the connection knowing these callback
//! types:
//! ```text
//! engine ── on_offer_created ──► NegotiationObserver
//!                                      │ emit(OfferCreated)
//!                                      ▼
//!                         EventEmitter::forwarder("conn.sdp", &conn)
//!                                      │ fan-out (no queue)
//!                                      ▼
//!                                conn queue ──► loop ──► conn handler
//! ```
//!
//! Kind values sit in the `0x200` range.

use std::sync::Arc;

use crate::emitter::EventEmitter;
use crate::events::Event;
use crate::observers::target::ObserverTarget;

/// Event kinds produced by [`NegotiationObserver`].
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationEventKind {
    /// Payload: [`SessionDescription`].
    OfferCreated = 0x200,
    /// Payload: `String` (engine failure message).
    OfferFailed = 0x201,
    /// Payload: [`SessionDescription`].
    AnswerCreated = 0x202,
    /// Payload: `String`.
    AnswerFailed = 0x203,
    /// No payload.
    LocalDescriptionSet = 0x204,
    /// Payload: `String`.
    LocalDescriptionFailed = 0x205,
    /// No payload.
    RemoteDescriptionSet = 0x206,
    /// Payload: `String`.
    RemoteDescriptionFailed = 0x207,
}

/// A session description produced by the engine. The `sdp` body is an opaque
/// payload; the bridge never parses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionDescription {
    /// "offer" or "answer", as labelled by the engine.
    pub kind: String,
    pub sdp: String,
}

/// Adapter for the engine's negotiation callback interfaces.
pub struct NegotiationObserver {
    target: ObserverTarget,
}

impl NegotiationObserver {
    /// Creates an observer reporting into `emitter` — typically a
    /// [`EventEmitter::forwarder`] over the owning connection's emitter.
    pub fn new(emitter: EventEmitter) -> Arc<Self> {
        Arc::new(Self {
            target: ObserverTarget::new(emitter),
        })
    }

    /// Rebinds or detaches the observer; `None` silences all later callbacks.
    pub fn set_emitter(&self, emitter: Option<EventEmitter>) {
        self.target.set_emitter(emitter);
    }

    pub fn on_offer_created(&self, description: SessionDescription) {
        self.target.emit(Event::with_payload(
            NegotiationEventKind::OfferCreated as u32,
            description,
        ));
    }

    pub fn on_offer_failed(&self, message: String) {
        self.target.emit(Event::with_payload(
            NegotiationEventKind::OfferFailed as u32,
            message,
        ));
    }

    pub fn on_answer_created(&self, description: SessionDescription) {
        self.target.emit(Event::with_payload(
            NegotiationEventKind::AnswerCreated as u32,
            description,
        ));
    }

    pub fn on_answer_failed(&self, message: String) {
        self.target.emit(Event::with_payload(
            NegotiationEventKind::AnswerFailed as u32,
            message,
        ));
    }

    pub fn on_local_description_set(&self) {
        self.target
            .emit(Event::new(NegotiationEventKind::LocalDescriptionSet as u32));
    }

    pub fn on_local_description_failed(&self, message: String) {
        self.target.emit(Event::with_payload(
            NegotiationEventKind::LocalDescriptionFailed as u32,
            message,
        ));
    }

    pub fn on_remote_description_set(&self) {
        self.target
            .emit(Event::new(NegotiationEventKind::RemoteDescriptionSet as u32));
    }

    pub fn on_remote_description_failed(&self, message: String) {
        self.target.emit(Event::with_payload(
            NegotiationEventKind::RemoteDescriptionFailed as u32,
            message,
        ));
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
    async fn test_offer_surfaces_on_connection_stream_via_forwarder() {
        let event_loop = EventLoop::new(LoopConfig::default());
        let collect = Arc::new(Collect {
            seen: Mutex::new(Vec::new()),
        });
        let connection = EventEmitter::new(&event_loop.handle(), "conn", collect.clone());
        let forwarder = EventEmitter::forwarder("conn.sdp", &connection);
        let observer = NegotiationObserver::new(forwarder);

        observer.on_offer_created(SessionDescription {
            kind: "offer".into(),
            sdp: "v=0\r\no=- 0 0 IN IP4 127.0.0.1\r\n".into(),
        });
        connection.dispatch_events().await;

        let seen = collect.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind(), NegotiationEventKind::OfferCreated as u32);
        let desc = seen[0].payload::<SessionDescription>().unwrap();
        assert_eq!(desc.kind, "offer");
    }

    #[tokio::test]
    async fn test_failure_callback_is_an_event_with_message() {
        let event_loop = EventLoop::new(LoopConfig::default());
        let collect = Arc::new(Collect {
            seen: Mutex::new(Vec::new()),
        });
        let connection = EventEmitter::new(&event_loop.handle(), "conn", collect.clone());
        let observer = NegotiationObserver::new(connection.clone());

        observer.on_answer_failed("no compatible codec".into());
        connection.dispatch_events().await;

        let seen = collect.seen.lock().unwrap();
        assert_eq!(seen[0].kind(), NegotiationEventKind::AnswerFailed as u32);
        assert_eq!(
            seen[0].payload::<String>().map(String::as_str),
            Some("no compatible codec")
        );
    }

    #[tokio::test]
    async fn test_detach_silences_late_one_shot_callbacks() {
        let event_loop = EventLoop::new(LoopConfig::default());
        let collect = Arc::new(Collect {
            seen: Mutex::new(Vec::new()),
        });
        let connection = EventEmitter::new(&event_loop.handle(), "conn", collect.clone());
        let observer = NegotiationObserver::new(connection.clone());

        observer.set_emitter(None);
        observer.on_local_description_set();
        connection.dispatch_events().await;

        assert!(collect.seen.lock().unwrap().is_empty());
    }
}
