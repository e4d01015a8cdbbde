//! Event data model.
//!
//! This module groups the event **data model** shared by every emitter and
//! observer adapter: an immutable, cheaply clonable value tagged with an
//! integer kind and carrying at most one opaquely-typed payload.
//!
//! ## Contents
//! - [`Event`] immutable tagged payload with a global sequence number
//!
//! ## Quick reference
//! - **Producers**: observer adapters (`observers::*`) and application code.
//! - **Consumers**: `Handler::on_event` implementations, driven by
//!   `EventEmitter::dispatch_events` on the consumer loop.
//!
//! See `core/mod.rs` for the system-level wiring diagram.

mod event;

pub use event::Event;
