//! # Example: forwarding
//!
//! Demonstrates the listener graph and the forwarder ("notify") pattern: a
//! negotiation observer's callbacks surface on the owning connection's own
//! event stream, and a second consumer taps that stream via `add_listener`.
//!
//! Shows how to:
//! - Build a [`EventEmitter::forwarder`] over a connection emitter.
//! - Drive it through a [`NegotiationObserver`] as an engine would.
//! - Tap one emitter's stream from another with [`EventEmitter::add_listener`].
//!
//! ## Flow
//! ```text
//! "engine" thread ── on_offer_created ──► NegotiationObserver
//!                                              │
//!                                     forwarder (no queue)
//!                                              │ fan-out
//!                          connection emitter ─┴─► tap emitter
//!                                   │                  │
//!                              [conn queue]       [tap queue]
//!                                   └────── EventLoop ─────┘
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example forwarding
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use loopbridge::{
    Event, EventEmitter, EventLoop, Handler, LoopConfig, NegotiationEventKind,
    NegotiationObserver, SessionDescription,
};

struct Named(&'static str);

#[async_trait]
impl Handler for Named {
    async fn on_event(&self, event: &Event) {
        let label = self.0;
        if event.kind() == NegotiationEventKind::OfferCreated as u32 {
            let desc = event.payload::<SessionDescription>().expect("offer payload");
            println!("[{label}] offer created ({} bytes of sdp)", desc.sdp.len());
        } else {
            println!("[{label}] kind={:#x}", event.kind());
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), loopbridge::LoopError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let event_loop = EventLoop::new(LoopConfig::default());
    let connection = EventEmitter::new(&event_loop.handle(), "conn", Arc::new(Named("conn")));
    let tap = EventEmitter::new(&event_loop.handle(), "tap", Arc::new(Named("tap")));

    // Everything the connection emits is also queued on the tap.
    connection.add_listener(&tap);

    // Negotiation results re-shape onto the connection's stream.
    let forwarder = EventEmitter::forwarder("conn.sdp", &connection);
    let observer = NegotiationObserver::new(forwarder);

    let engine = std::thread::spawn(move || {
        observer.on_offer_created(SessionDescription {
            kind: "offer".into(),
            sdp: "v=0\r\no=- 4611731400430051336 2 IN IP4 127.0.0.1\r\n".into(),
        });
        observer.on_local_description_set();
    });
    engine.join().expect("engine thread");

    // Both consumers drain on the same loop, each from its own queue.
    event_loop.run().await
}
