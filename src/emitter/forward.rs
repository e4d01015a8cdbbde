//! # Forward-only ("notify") emitters.
//!
//! A forwarder is an [`EventEmitter`] with no queue and no handler of its own:
//! everything emitted into it is synchronously re-emitted into the single
//! downstream listener it was bound to at construction. It exists so an
//! observer adapter can re-shape engine callbacks into another emitter's
//! stream without that emitter knowing the engine's callback types.
//!
//! ## Architecture
//! ```text
//! engine callback ──► NegotiationObserver ──► forwarder.emit(ev)
//!                                                   │  (no queue)
//!                                                   ▼
//!                                        connection_emitter.emit(ev)
//!                                                   │
//!                                            [connection queue] ──► loop
//! ```
//!
//! ## Rules
//! - The downstream edge is fixed at construction; the relation is a DAG by
//!   construction since a forwarder only ever points at emitters that already
//!   exist (plus `add_listener` rejects self-registration).
//! - Chains are expected to stay shallow (1–2 levels). Fan-out recursion has
//!   no depth bound; `emit` logs a warning past a fixed depth.
//! - `close` walks the listener/parent edges like any other emitter, so
//!   teardown needs no special casing.

use std::sync::Arc;

use super::emitter::EventEmitter;

impl EventEmitter {
    /// Creates a forward-only emitter bound to exactly one downstream
    /// listener.
    ///
    /// The returned emitter owns no queue and keeps no loop resident;
    /// [`emit`](Self::emit) on it fans out into `downstream` (and transitively
    /// into *its* listeners) and nothing else.
    /// [`dispatch_events`](Self::dispatch_events) on a forwarder is a no-op.
    pub fn forwarder(label: impl Into<Arc<str>>, downstream: &EventEmitter) -> Self {
        let forwarder = Self::queueless(label.into());
        forwarder.add_listener(downstream);
        forwarder
    }
}
