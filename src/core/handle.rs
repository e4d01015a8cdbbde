//! # LoopHandle: the cross-thread face of a consumer loop.
//!
//! A [`LoopHandle`] is what emitters bind to. It bundles the wakeup primitive,
//! the keep-alive counter, the emitter registry, and the shutdown token into
//! one cheap-clone, `Send + Sync` handle.
//!
//! ## Rules
//! - **Wakeup is idempotent**: [`LoopHandle::wake`] stores at most one permit
//!   (`tokio::sync::Notify`); coalesced wakes are fine, the loop re-scans all
//!   queues on every wake. A lost platform wakeup is self-healing — the next
//!   `emit` signals again and the queue was never touched.
//! - **Keep-alive is a counter**: each emitter contributes at most one unit,
//!   managed by `EventEmitter::set_keep_alive` / `close`.
//! - **Registry holds weak references**: the loop never keeps an emitter
//!   alive; dead and spent entries are pruned during drains.

use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::emitter::Inner;

pub(crate) struct Shared {
    /// "Wake me up, there is work" — not a counted semaphore.
    pub(crate) notify: Notify,
    /// Number of emitters currently flagged keep-alive.
    keep_alive: AtomicUsize,
    /// Weak references to every emitter bound to this loop.
    pub(crate) registry: Mutex<Vec<Weak<Inner>>>,
    /// Cancelled by `shutdown()`; observed by the loop's wait.
    pub(crate) token: CancellationToken,
    /// One-shot warning threshold for queue depth (0 = disabled).
    warn_queue_depth: usize,
}

/// Cheap-clone handle to a consumer loop, safe to use from any thread.
#[derive(Clone)]
pub struct LoopHandle {
    pub(crate) shared: Arc<Shared>,
}

impl LoopHandle {
    pub(crate) fn new(warn_queue_depth: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                notify: Notify::new(),
                keep_alive: AtomicUsize::new(0),
                registry: Mutex::new(Vec::new()),
                token: CancellationToken::new(),
                warn_queue_depth,
            }),
        }
    }

    /// Signals the loop that there is work. Callable from any thread,
    /// including non-async engine threads; never blocks.
    pub fn wake(&self) {
        self.shared.notify.notify_one();
    }

    /// Requests shutdown: the loop performs one final (grace-bounded) drain
    /// and exits. Pending events are drained, never dropped silently; an
    /// overrun is reported as `LoopError::GraceExceeded`.
    pub fn shutdown(&self) {
        self.shared.token.cancel();
        self.wake();
    }

    /// Whether shutdown has been requested.
    pub fn is_shutdown(&self) -> bool {
        self.shared.token.is_cancelled()
    }

    /// Number of emitters currently keeping the loop resident.
    pub fn keep_alive_count(&self) -> usize {
        self.shared.keep_alive.load(AtomicOrdering::Acquire)
    }

    pub(crate) fn keep_alive_inc(&self) {
        self.shared.keep_alive.fetch_add(1, AtomicOrdering::AcqRel);
    }

    pub(crate) fn keep_alive_dec(&self) {
        let prev = self.shared.keep_alive.fetch_sub(1, AtomicOrdering::AcqRel);
        debug_assert!(prev > 0, "keep-alive counter underflow");
    }

    pub(crate) fn warn_queue_depth(&self) -> usize {
        self.shared.warn_queue_depth
    }

    pub(crate) fn register(&self, emitter: Weak<Inner>) {
        self.shared
            .registry
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(emitter);
    }

    /// Snapshot of live registered emitters; prunes entries that are dead or
    /// spent (closed with an empty queue — they can never produce work again).
    pub(crate) fn live_emitters(&self) -> Vec<Arc<Inner>> {
        let mut registry = self
            .shared
            .registry
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        registry.retain(|weak| weak.upgrade().is_some_and(|inner| !inner.is_spent()));
        registry.iter().filter_map(Weak::upgrade).collect()
    }
}
