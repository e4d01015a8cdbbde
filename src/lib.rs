//! # loopbridge
//!
//! **loopbridge** is a cross-thread event bridge: native engine objects emit
//! events from any of their worker/signaling threads, and every event is
//! dispatched exactly once, in order, on one designated consumer loop.
//!
//! It provides the primitives to bind a multi-threaded engine to a
//! single-threaded host runtime: per-object FIFO queues, a listener graph for
//! forwarding, keep-alive accounting for loop residency, and detachable
//! observer adapters for engine callback interfaces.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!  engine threads (signaling / worker pool / capture)
//!     │                 │                  │
//!     ▼                 ▼                  ▼
//!  ┌──────────────┐  ┌──────────────┐  ┌──────────────┐
//!  │ Connection   │  │ Channel      │  │ Media        │   observer adapters
//!  │ Observer     │  │ Observer     │  │ Observer     │   (detachable targets)
//!  └──────┬───────┘  └──────┬───────┘  └──────┬───────┘
//!         │ emit(Event)     │ emit(Event)     │ emit(Event)
//!         ▼                 ▼                 ▼
//!  ┌───────────────────────────────────────────────────────────────────┐
//!  │  EventEmitter (one per host-visible object)                       │
//!  │  - FIFO queue (one mutex, pushed from any thread)                 │
//!  │  - listeners / parents (forwarding DAG, synchronous fan-out)      │
//!  │  - keep-alive flag (loop residency)                               │
//!  └──────────────────────────────┬────────────────────────────────────┘
//!                                 │ LoopHandle::wake()  (tokio::sync::Notify)
//!                                 ▼
//!  ┌───────────────────────────────────────────────────────────────────┐
//!  │  EventLoop::run()  (the one consumer thread)                      │
//!  │  - drains every registered queue per wake                         │
//!  │  - Handler::on_event(&Event), FIFO per emitter, panics isolated   │
//!  │  - exits when idle with keep-alive count 0, or on shutdown        │
//!  └───────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ### Delivery guarantees
//! ```text
//! emit(e1); emit(e2)  on one thread   → on_event(e1) before on_event(e2)
//! concurrent emitters                 → per-thread order kept, full set once
//! a.add_listener(&b); a.emit(e)       → e in a's queue AND b's queue before
//!                                       emit returns (dispatch stays async)
//! remove_listener / close             → future emissions only; queued events
//!                                       still drain
//! lost wakeup                         → latency, never loss: next emit
//!                                       re-signals, queues are untouched
//! ```
//!
//! ## Features
//! | Area            | Description                                             | Key types                                |
//! |-----------------|---------------------------------------------------------|------------------------------------------|
//! | **Events**      | Immutable tagged payloads, cheap fan-out clones.        | [`Event`]                                |
//! | **Emitters**    | Queue + listener graph + keep-alive, per object.        | [`EventEmitter`], [`Handler`]            |
//! | **Loop**        | Drain cycle, residency, grace-bounded shutdown.         | [`EventLoop`], [`LoopHandle`], [`LoopConfig`] |
//! | **Observers**   | Engine callback interfaces → events, detachable.        | [`ConnectionObserver`], [`ChannelObserver`], … |
//! | **Errors**      | Loop lifecycle only; `emit` is infallible.              | [`LoopError`]                            |
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use loopbridge::{Event, EventEmitter, EventLoop, Handler, LoopConfig};
//!
//! struct Printer;
//!
//! #[async_trait]
//! impl Handler for Printer {
//!     async fn on_event(&self, event: &Event) {
//!         if let Some(text) = event.payload::<String>() {
//!             println!("kind={} payload={text}", event.kind());
//!         }
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), loopbridge::LoopError> {
//!     let event_loop = EventLoop::new(LoopConfig::default());
//!     let emitter = EventEmitter::new(&event_loop.handle(), "demo", Arc::new(Printer));
//!
//!     // Emit from a foreign OS thread, exactly as an engine would.
//!     let producer = {
//!         let emitter = emitter.clone();
//!         std::thread::spawn(move || {
//!             emitter.emit(Event::with_payload(7, "hello".to_string()));
//!         })
//!     };
//!     producer.join().expect("producer thread");
//!
//!     // Drains the queue, then exits: nothing holds keep-alive.
//!     event_loop.run().await
//! }
//! ```

mod core;
mod emitter;
mod error;
mod events;
mod observers;

// ---- Public re-exports ----

pub use self::core::{EventLoop, LoopConfig, LoopHandle};
pub use emitter::{EventEmitter, Handler};
pub use error::LoopError;
pub use events::Event;
pub use observers::{
    ChannelEventKind, ChannelObserver, ChannelState, ConnectionEventKind, ConnectionObserver,
    IceCandidateInfo, IceConnectionState, IceGatheringState, MediaEventKind, MediaObserver,
    MessageData, NegotiationEventKind, NegotiationObserver, ObserverTarget, SessionDescription,
    SignalingState, StatsEventKind, StatsObserver, TrackInfo,
};
