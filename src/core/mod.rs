//! Runtime core: the consumer loop and its handle.
//!
//! This module contains the single-threaded side of the bridge. The public
//! API is [`EventLoop`] (the drain cycle + residency policy), [`LoopHandle`]
//! (the cross-thread face emitters bind to), and [`LoopConfig`].
//!
//! ## System wiring
//! ```text
//!  engine threads (any number)                 consumer loop (exactly one)
//!  ──────────────────────────                  ──────────────────────────
//!  Observer adapter callbacks                  EventLoop::run()
//!        │                                        │
//!        ▼                                        ├─ drain emitter queues
//!  EventEmitter::emit(ev)                         │    └─ Handler::on_event
//!        ├── own queue (mutex)                    ├─ exit when idle and
//!        ├── listener fan-out (sync)              │  keep-alive count == 0
//!        └── LoopHandle::wake() ────────────────► └─ or shutdown + grace
//! ```
//!
//! Modules:
//! - [`config`]: loop settings with sentinel semantics;
//! - [`handle`]: wakeup, keep-alive counter, registry, shutdown token;
//! - [`event_loop`]: drain cycle, idle exit, grace-bounded shutdown.

mod config;
mod event_loop;
mod handle;

pub use config::LoopConfig;
pub use event_loop::EventLoop;
pub use handle::LoopHandle;
