//! # Emitters: the thread-safe units of the bridge.
//!
//! This module provides [`EventEmitter`] — a per-object FIFO queue plus a
//! listener/parent graph node plus a keep-alive flag — and the [`Handler`]
//! trait, the bridge's per-emitter override point.
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   engine thread ── emit(Event) ──► own queue + listener fan-out ──► wake loop
//!                                                                       │
//!   consumer loop ── dispatch_events() ──► Handler::on_event(&Event) ◄──┘
//! ```
//!
//! ## Emitter shapes
//! - **Loop-bound emitters** — own a queue, a handler, and a loop binding;
//!   created with [`EventEmitter::new`].
//! - **Forward-only emitters** — no queue, re-emit into one fixed downstream
//!   listener; created with [`EventEmitter::forwarder`].
//!
//! ## Implementing a handler
//! ```no_run
//! use loopbridge::{Event, Handler};
//! use async_trait::async_trait;
//!
//! struct Connection;
//!
//! #[async_trait]
//! impl Handler for Connection {
//!     async fn on_event(&self, event: &Event) {
//!         match event.kind() {
//!             // route to host-visible callbacks ("onmessage", "onopen", ...)
//!             _ => {}
//!         }
//!     }
//! }
//! ```

mod emitter;
mod forward;

pub use emitter::{EventEmitter, Handler};
pub(crate) use emitter::Inner;
