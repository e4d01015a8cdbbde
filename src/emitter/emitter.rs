//! # EventEmitter: per-object queue, listener graph, and dispatch.
//!
//! An [`EventEmitter`] is the unit of the bridge. Engine threads call
//! [`EventEmitter::emit`] from anywhere; the consumer loop calls
//! [`EventEmitter::dispatch_events`] on its own thread and invokes the
//! emitter's [`Handler`] once per event, in FIFO order.
//!
//! ## Architecture
//! ```text
//! engine thread A ──┐
//! engine thread B ──┼── emit(ev) ──► [own queue] ─── wake ──► consumer loop
//! consumer loop   ──┘      │                                        │
//!                          │ synchronous fan-out            dispatch_events()
//!                          ▼ (snapshot, outside lock)               │
//!                   listener.emit(ev) ...                  handler.on_event(&ev)
//! ```
//!
//! ## Rules
//! - **Non-blocking emit**: the critical section is enqueue + bookkeeping only;
//!   fan-out recursion and the wakeup happen outside the lock.
//! - **Per-emitter FIFO**: one mutex per emitter orders concurrent emits; the
//!   queue is popped only by the consumer loop.
//! - **No nested emitter locks**: listener and parent edges are updated in two
//!   phases, one lock at a time, so there is no lock-ordering cycle.
//! - **Closed means silent**: `emit` on a closed emitter is a no-op, never a
//!   crash; events queued before `close` still drain.
//! - **Panic isolation**: a panicking handler drops that one event (logged);
//!   the queue and the loop survive.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use async_trait::async_trait;
use futures::FutureExt;

use crate::core::LoopHandle;
use crate::events::Event;

/// Fan-out depth past which a graph is suspicious. The design expects 1–2
/// levels; see the module docs in `emitter/forward.rs`.
const FANOUT_WARN_DEPTH: usize = 8;

/// Contract for the per-emitter event handler — the bridge's override point.
///
/// Called only from the consumer loop, once per event, in the emitter's FIFO
/// order. Implementations may call [`EventEmitter::emit`] re-entrantly (the
/// queue lock is not held during `on_event`).
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Handle a single event for this emitter.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Mutable emitter state, guarded by one mutex per emitter.
struct State {
    /// FIFO of events awaiting dispatch. Pushed from any thread, popped only
    /// by the consumer loop.
    queue: VecDeque<Event>,
    /// Emitters that receive everything this one emits (strong, downstream).
    listeners: Vec<EventEmitter>,
    /// Back-references to emitters listening *to* this one. Used only for
    /// teardown bookkeeping, never for traversal or emission.
    parents: Vec<Weak<Inner>>,
    /// Whether this emitter is a reason for the loop to stay resident.
    keep_alive: bool,
    /// Set by `close`; makes every later `emit` a silent no-op.
    closed: bool,
    /// Latched once the queue-depth warning has fired; resets on drain.
    depth_warned: bool,
}

pub(crate) struct Inner {
    label: Arc<str>,
    /// `None` for forward-only emitters (no queue of their own).
    handle: Option<LoopHandle>,
    /// `None` for forward-only emitters (nothing to dispatch).
    handler: Option<Arc<dyn Handler>>,
    state: Mutex<State>,
}

impl Inner {
    /// Locks the state, recovering from poisoning: the lock is never held
    /// across user code, so a poisoned guard still holds consistent state.
    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub(crate) fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn pending(&self) -> usize {
        self.lock().queue.len()
    }

    /// True once the emitter can never produce work again: closed and drained.
    pub(crate) fn is_spent(&self) -> bool {
        let st = self.lock();
        st.closed && st.queue.is_empty()
    }
}

/// An object that owns an event queue, a listener/parent set, and a keep-alive
/// flag; the externally visible unit of the bridge.
///
/// Cheap to clone — clones share the same queue and listener graph node.
#[derive(Clone)]
pub struct EventEmitter {
    pub(crate) inner: Arc<Inner>,
}

impl EventEmitter {
    /// Creates an emitter bound to a consumer loop.
    ///
    /// The emitter registers itself with the loop and starts with
    /// `keep_alive = false`: it does not by itself keep the loop resident
    /// until [`set_keep_alive`](Self::set_keep_alive) says otherwise.
    pub fn new(handle: &LoopHandle, label: impl Into<Arc<str>>, handler: Arc<dyn Handler>) -> Self {
        let emitter = Self {
            inner: Arc::new(Inner {
                label: label.into(),
                handle: Some(handle.clone()),
                handler: Some(handler),
                state: Mutex::new(State {
                    queue: VecDeque::new(),
                    listeners: Vec::new(),
                    parents: Vec::new(),
                    keep_alive: false,
                    closed: false,
                    depth_warned: false,
                }),
            }),
        };
        handle.register(Arc::downgrade(&emitter.inner));
        emitter
    }

    /// Internal constructor for forward-only emitters (see `forward.rs`).
    pub(crate) fn queueless(label: Arc<str>) -> Self {
        Self {
            inner: Arc::new(Inner {
                label,
                handle: None,
                handler: None,
                state: Mutex::new(State {
                    queue: VecDeque::new(),
                    listeners: Vec::new(),
                    parents: Vec::new(),
                    keep_alive: false,
                    closed: false,
                    depth_warned: false,
                }),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Arc<Inner>) -> Self {
        Self { inner }
    }

    /// Label given at construction (for logs and `GraceExceeded` reports).
    pub fn label(&self) -> &str {
        self.inner.label()
    }

    /// Emits an event: appends it to this emitter's own queue (if loop-bound),
    /// synchronously re-emits into every current listener, then signals the
    /// loop's wakeup once.
    ///
    /// Callable from any thread. Never blocks beyond the short per-emitter
    /// lock, and never fails from the caller's point of view: emitting on a
    /// closed emitter is a silent no-op.
    pub fn emit(&self, event: Event) {
        self.emit_at(event, 0);
    }

    fn emit_at(&self, event: Event, depth: usize) {
        let (listeners, queued) = {
            let mut st = self.inner.lock();
            if st.closed {
                tracing::trace!(emitter = %self.inner.label, kind = event.kind(), "emit on closed emitter ignored");
                return;
            }
            let queued = if self.inner.handle.is_some() {
                st.queue.push_back(event.clone());
                self.maybe_warn_depth(&mut st);
                true
            } else {
                false
            };
            let listeners = if st.listeners.is_empty() {
                Vec::new()
            } else {
                st.listeners.clone()
            };
            (listeners, queued)
        };

        if depth == FANOUT_WARN_DEPTH && !listeners.is_empty() {
            tracing::warn!(
                emitter = %self.inner.label,
                depth,
                "listener graph deeper than expected; fan-out is recursive"
            );
        }
        // Fan-out over the snapshot, outside the lock: a listener set mutated
        // mid-emission affects future emits only, and re-entrant graph edits
        // cannot deadlock.
        for listener in &listeners {
            listener.emit_at(event.clone(), depth + 1);
        }

        if queued {
            if let Some(handle) = &self.inner.handle {
                handle.wake();
            }
        }
    }

    fn maybe_warn_depth(&self, st: &mut State) {
        let Some(handle) = &self.inner.handle else { return };
        let threshold = handle.warn_queue_depth();
        if threshold == 0 {
            return;
        }
        if st.queue.len() >= threshold && !st.depth_warned {
            st.depth_warned = true;
            tracing::warn!(
                emitter = %self.inner.label,
                depth = st.queue.len(),
                threshold,
                "event queue depth crossed warning threshold; consumer loop may be stalled"
            );
        }
    }

    /// Registers `other` to receive everything this emitter emits, and this
    /// emitter as a parent of `other`.
    ///
    /// Idempotent; a no-op if `other` is this emitter itself or either side is
    /// closed. The forwarding relation must stay a DAG — that is a usage
    /// contract, only self-registration is rejected here.
    pub fn add_listener(&self, other: &EventEmitter) {
        if Arc::ptr_eq(&self.inner, &other.inner) {
            return;
        }
        {
            let mut st = self.inner.lock();
            if st.closed {
                return;
            }
            if st
                .listeners
                .iter()
                .any(|l| Arc::ptr_eq(&l.inner, &other.inner))
            {
                return;
            }
            st.listeners.push(other.clone());
        }
        let me = Arc::downgrade(&self.inner);
        let mut st = other.inner.lock();
        if st.closed {
            // Lost the race with other.close(); undo our half of the edge.
            drop(st);
            self.inner
                .lock()
                .listeners
                .retain(|l| !Arc::ptr_eq(&l.inner, &other.inner));
            return;
        }
        if !st.parents.iter().any(|p| p.ptr_eq(&me)) {
            st.parents.push(me);
        }
    }

    /// Removes a forwarding edge; the matching parent back-reference on
    /// `other` goes with it. A no-op if the pair was never registered.
    ///
    /// Takes effect for future emissions only: events already queued on
    /// `other` are still delivered.
    pub fn remove_listener(&self, other: &EventEmitter) {
        self.inner
            .lock()
            .listeners
            .retain(|l| !Arc::ptr_eq(&l.inner, &other.inner));
        let me = Arc::downgrade(&self.inner);
        other.inner.lock().parents.retain(|p| !p.ptr_eq(&me));
    }

    /// Removes every forwarding edge this emitter holds, clearing the
    /// corresponding parent back-references.
    pub fn remove_all_listeners(&self) {
        let removed: Vec<EventEmitter> = {
            let mut st = self.inner.lock();
            st.listeners.drain(..).collect()
        };
        let me = Arc::downgrade(&self.inner);
        for listener in removed {
            listener.inner.lock().parents.retain(|p| !p.ptr_eq(&me));
        }
    }

    /// Toggles whether the consumer loop should treat this emitter as a
    /// reason to stay resident.
    ///
    /// Does not drop or delay pending events either way: already-queued
    /// events are delivered on the next drain regardless of the flag.
    pub fn set_keep_alive(&self, keep: bool) {
        let changed = {
            let mut st = self.inner.lock();
            if st.closed || st.keep_alive == keep {
                false
            } else {
                st.keep_alive = keep;
                true
            }
        };
        if changed {
            if let Some(handle) = &self.inner.handle {
                if keep {
                    handle.keep_alive_inc();
                } else {
                    handle.keep_alive_dec();
                }
                // The loop re-evaluates residency on every wake.
                handle.wake();
            }
        }
    }

    /// Current keep-alive flag.
    pub fn keep_alive(&self) -> bool {
        self.inner.lock().keep_alive
    }

    /// Number of events queued and not yet dispatched.
    pub fn pending_events(&self) -> usize {
        self.inner.pending()
    }

    /// Whether this emitter has been closed.
    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    /// Tears the emitter down: every later `emit` becomes a no-op, all
    /// listener/parent edges are removed (both directions), and the keep-alive
    /// contribution is withdrawn.
    ///
    /// Events queued before the close still drain — destruction of the graph
    /// node never loses in-flight events.
    pub fn close(&self) {
        let (listeners, parents, had_keep_alive) = {
            let mut st = self.inner.lock();
            if st.closed {
                return;
            }
            st.closed = true;
            let had = st.keep_alive;
            st.keep_alive = false;
            (
                std::mem::take(&mut st.listeners),
                std::mem::take(&mut st.parents),
                had,
            )
        };
        let me = Arc::downgrade(&self.inner);
        for listener in listeners {
            listener.inner.lock().parents.retain(|p| !p.ptr_eq(&me));
        }
        for parent in parents {
            if let Some(parent) = parent.upgrade() {
                parent
                    .lock()
                    .listeners
                    .retain(|l| !Arc::ptr_eq(&l.inner, &self.inner));
            }
        }
        if let Some(handle) = &self.inner.handle {
            if had_keep_alive {
                handle.keep_alive_dec();
            }
            handle.wake();
        }
        tracing::trace!(emitter = %self.inner.label, "emitter closed");
    }

    /// Drains the queue, invoking the handler once per event in FIFO order.
    ///
    /// Consumer-loop thread only. The lock is released while `on_event` runs,
    /// so handlers may re-enter `emit` freely; events emitted mid-dispatch are
    /// picked up in the same drain. Handler panics are caught and logged, the
    /// offending event is dropped, and draining continues.
    pub async fn dispatch_events(&self) {
        let Some(handler) = self.inner.handler.as_ref() else {
            return;
        };
        loop {
            // Pop in its own scope: the guard must not survive into the
            // handler await.
            let event = {
                let mut st = self.inner.lock();
                let event = st.queue.pop_front();
                if event.is_none() {
                    st.depth_warned = false;
                }
                event
            };
            let Some(event) = event else { break };
            let fut = handler.on_event(&event);
            if let Err(panic) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
                tracing::error!(
                    emitter = %self.inner.label,
                    handler = handler.name(),
                    panic = %panic_message(&panic),
                    kind = event.kind(),
                    "handler panicked; event dropped"
                );
            }
        }
    }
}

impl std::fmt::Debug for EventEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let st = self.inner.lock();
        f.debug_struct("EventEmitter")
            .field("label", &self.inner.label)
            .field("pending", &st.queue.len())
            .field("listeners", &st.listeners.len())
            .field("keep_alive", &st.keep_alive)
            .field("closed", &st.closed)
            .finish()
    }
}

/// Extracts a printable message from a caught panic payload.
fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = panic.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EventLoop, LoopConfig};

    /// Handler that records every event it sees.
    struct Collect {
        seen: Mutex<Vec<Event>>,
    }

    impl Collect {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
            })
        }

        fn kinds(&self) -> Vec<u32> {
            self.seen.lock().unwrap().iter().map(Event::kind).collect()
        }
    }

    #[async_trait]
    impl Handler for Collect {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.clone());
        }
    }

    fn bound(label: &str, handler: Arc<dyn Handler>) -> EventEmitter {
        let event_loop = EventLoop::new(LoopConfig::default());
        EventEmitter::new(&event_loop.handle(), label.to_string(), handler)
    }

    #[tokio::test]
    async fn test_single_emit_dispatches_once_with_payload() {
        let collect = Collect::new();
        let emitter = bound("a", collect.clone());
        emitter.set_keep_alive(false);

        emitter.emit(Event::with_payload(7, "hello".to_string()));
        emitter.dispatch_events().await;

        let seen = collect.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind(), 7);
        assert_eq!(seen[0].payload::<String>().map(String::as_str), Some("hello"));
    }

    #[tokio::test]
    async fn test_fifo_order_single_thread() {
        let collect = Collect::new();
        let emitter = bound("a", collect.clone());

        for kind in 0..100 {
            emitter.emit(Event::new(kind));
        }
        emitter.dispatch_events().await;

        assert_eq!(collect.kinds(), (0..100).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_fan_out_is_synchronous_within_emit() {
        let ca = Collect::new();
        let cb = Collect::new();
        let a = bound("a", ca.clone());
        let b = bound("b", cb.clone());
        a.add_listener(&b);

        a.emit(Event::new(1));

        // Dispatch is asynchronous, but both queues are filled before emit returns.
        assert_eq!(a.pending_events(), 1);
        assert_eq!(b.pending_events(), 1);

        a.dispatch_events().await;
        b.dispatch_events().await;
        assert_eq!(ca.kinds(), vec![1]);
        assert_eq!(cb.kinds(), vec![1]);
    }

    #[tokio::test]
    async fn test_duplicate_add_listener_delivers_once() {
        let cb = Collect::new();
        let a = bound("a", Collect::new());
        let b = bound("b", cb.clone());
        a.add_listener(&b);
        a.add_listener(&b);

        a.emit(Event::new(3));
        b.dispatch_events().await;

        assert_eq!(cb.kinds(), vec![3]);
    }

    #[test]
    fn test_add_listener_rejects_self() {
        let a = bound("a", Collect::new());
        a.add_listener(&a.clone());
        a.emit(Event::new(1));
        assert_eq!(a.pending_events(), 1, "self-edge would have doubled this");
    }

    #[tokio::test]
    async fn test_remove_listener_is_idempotent_and_stops_fan_out() {
        let cb = Collect::new();
        let a = bound("a", Collect::new());
        let b = bound("b", cb.clone());

        // Removing a never-registered pair is a no-op.
        a.remove_listener(&b);

        a.add_listener(&b);
        a.emit(Event::new(1));
        a.remove_listener(&b);
        a.emit(Event::new(2));

        b.dispatch_events().await;
        assert_eq!(cb.kinds(), vec![1], "removal affects future emissions only");
    }

    #[tokio::test]
    async fn test_remove_all_listeners() {
        let a = bound("a", Collect::new());
        let b = bound("b", Collect::new());
        let c = bound("c", Collect::new());
        a.add_listener(&b);
        a.add_listener(&c);

        a.remove_all_listeners();
        a.emit(Event::new(9));

        assert_eq!(b.pending_events(), 0);
        assert_eq!(c.pending_events(), 0);
        assert_eq!(a.pending_events(), 1);
    }

    #[tokio::test]
    async fn test_keep_alive_false_still_delivers_queued_events() {
        let collect = Collect::new();
        let emitter = bound("a", collect.clone());
        emitter.set_keep_alive(true);

        for kind in 0..10 {
            emitter.emit(Event::new(kind));
        }
        emitter.set_keep_alive(false);
        emitter.dispatch_events().await;

        assert_eq!(collect.kinds().len(), 10);
    }

    #[tokio::test]
    async fn test_emit_after_close_is_noop_but_queued_events_drain() {
        let collect = Collect::new();
        let emitter = bound("a", collect.clone());

        emitter.emit(Event::new(1));
        emitter.close();
        emitter.emit(Event::new(2));
        emitter.dispatch_events().await;

        assert_eq!(collect.kinds(), vec![1]);
    }

    #[tokio::test]
    async fn test_close_removes_edges_in_both_directions() {
        let a = bound("a", Collect::new());
        let b = bound("b", Collect::new());
        let c = bound("c", Collect::new());
        a.add_listener(&b);
        c.add_listener(&a);

        a.close();

        c.emit(Event::new(1));
        b.dispatch_events().await;
        assert_eq!(b.pending_events(), 0, "closed middle emitter must not forward");
        {
            let st = c.inner.lock();
            assert!(st.listeners.is_empty(), "parent must have dropped the closed listener");
        }
    }

    #[tokio::test]
    async fn test_reentrant_emit_from_handler_does_not_deadlock() {
        struct Reemit {
            target: Mutex<Option<EventEmitter>>,
            seen: Mutex<Vec<u32>>,
        }

        #[async_trait]
        impl Handler for Reemit {
            async fn on_event(&self, event: &Event) {
                self.seen.lock().unwrap().push(event.kind());
                if event.kind() == 1 {
                    if let Some(target) = self.target.lock().unwrap().as_ref() {
                        target.emit(Event::new(2));
                    }
                }
            }
        }

        let handler = Arc::new(Reemit {
            target: Mutex::new(None),
            seen: Mutex::new(Vec::new()),
        });
        let emitter = bound("a", handler.clone());
        *handler.target.lock().unwrap() = Some(emitter.clone());

        emitter.emit(Event::new(1));
        emitter.dispatch_events().await;

        assert_eq!(*handler.seen.lock().unwrap(), vec![1, 2]);
    }

    #[tokio::test]
    async fn test_panicking_handler_drops_event_and_continues() {
        struct Explode {
            seen: Mutex<Vec<u32>>,
        }

        #[async_trait]
        impl Handler for Explode {
            async fn on_event(&self, event: &Event) {
                if event.kind() == 1 {
                    panic!("boom");
                }
                self.seen.lock().unwrap().push(event.kind());
            }
        }

        let handler = Arc::new(Explode {
            seen: Mutex::new(Vec::new()),
        });
        let emitter = bound("a", handler.clone());
        emitter.emit(Event::new(1));
        emitter.emit(Event::new(2));
        emitter.dispatch_events().await;

        assert_eq!(*handler.seen.lock().unwrap(), vec![2]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_emitters_preserve_per_thread_order() {
        const THREADS: u64 = 4;
        const PER_THREAD: u64 = 250;

        let collect = Collect::new();
        let emitter = bound("a", collect.clone());

        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                let emitter = emitter.clone();
                std::thread::spawn(move || {
                    for i in 0..PER_THREAD {
                        // Unique monotonically increasing payload per thread.
                        emitter.emit(Event::with_payload(t as u32, t * PER_THREAD + i));
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        emitter.dispatch_events().await;

        let seen = collect.seen.lock().unwrap();
        assert_eq!(seen.len(), (THREADS * PER_THREAD) as usize);

        let mut values: Vec<u64> = Vec::new();
        let mut last_per_thread = vec![None::<u64>; THREADS as usize];
        for ev in seen.iter() {
            let v = *ev.payload::<u64>().unwrap();
            values.push(v);
            let t = (v / PER_THREAD) as usize;
            if let Some(prev) = last_per_thread[t] {
                assert!(v > prev, "per-thread order violated: {v} after {prev}");
            }
            last_per_thread[t] = Some(v);
        }
        values.sort_unstable();
        values.dedup();
        assert_eq!(
            values.len(),
            (THREADS * PER_THREAD) as usize,
            "delivery set must be duplicate-free and complete"
        );
    }
}
