//! # EventLoop: drains emitter queues on one thread.
//!
//! The [`EventLoop`] is the single place where queues are popped and handlers
//! run. Emitters bind to it through its [`LoopHandle`] and wake it from any
//! thread; the loop re-scans every registered queue per wake.
//!
//! ## Architecture
//! ```text
//! run():
//!   loop {
//!     ├─► arm wakeup (before any checks — a racing emit is never lost)
//!     ├─► drain every registered emitter (dispatch_events, FIFO each)
//!     ├─► token cancelled?          → final drain bounded by grace → exit
//!     ├─► queues empty + keep-alive == 0 → exit Ok (nothing keeps us resident)
//!     └─► await wakeup | cancellation
//!   }
//!
//! Shutdown path:
//!   LoopHandle::shutdown()
//!     └─► token.cancel() + wake()
//!     └─► drain until idle, bounded by LoopConfig::grace:
//!            ├─ Ok (all queues empty) → exit Ok
//!            └─ budget exceeded       → Err(LoopError::GraceExceeded { stuck })
//! ```
//!
//! ## Rules
//! - **Exactly-once dispatch**: a queue is popped only here; `run` refuses
//!   concurrent entry ([`LoopError::AlreadyRunning`]).
//! - **Keep-alive controls residency, never delivery**: queued events are
//!   drained before any exit decision, whatever the flags say.
//! - **Lost wakeups are latency, not loss**: the wakeup is armed before the
//!   idle check, and every `emit` re-signals; the queue is untouched by a
//!   missed signal.

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};

use crate::core::config::LoopConfig;
use crate::core::handle::LoopHandle;
use crate::emitter::EventEmitter;
use crate::error::LoopError;

/// Consumer loop: owns residency policy and the drain cycle for every emitter
/// bound to its handle.
pub struct EventLoop {
    cfg: LoopConfig,
    handle: LoopHandle,
    running: AtomicBool,
}

impl EventLoop {
    /// Creates a loop with the given configuration. Emitters bind to it via
    /// [`handle`](Self::handle); nothing runs until [`run`](Self::run).
    pub fn new(cfg: LoopConfig) -> Self {
        let handle = LoopHandle::new(cfg.warn_queue_depth);
        Self {
            cfg,
            handle,
            running: AtomicBool::new(false),
        }
    }

    /// Handle for binding emitters, waking, and requesting shutdown.
    pub fn handle(&self) -> LoopHandle {
        self.handle.clone()
    }

    /// Drives the loop until nothing keeps it resident (all queues empty and
    /// keep-alive count zero) or shutdown is requested.
    ///
    /// Returns [`LoopError::AlreadyRunning`] if another `run` is active, and
    /// [`LoopError::GraceExceeded`] if a requested shutdown could not drain
    /// every queue within [`LoopConfig::grace`]. A clean exit leaves the loop
    /// reusable: later emits queue up and a new `run` will deliver them.
    pub async fn run(&self) -> Result<(), LoopError> {
        if self.running.swap(true, AtomicOrdering::AcqRel) {
            return Err(LoopError::AlreadyRunning);
        }
        let result = self.run_inner().await;
        self.running.store(false, AtomicOrdering::Release);
        result
    }

    async fn run_inner(&self) -> Result<(), LoopError> {
        let shared = &self.handle.shared;
        loop {
            if shared.token.is_cancelled() {
                return self.final_drain().await;
            }

            // Arm before draining/checking: an emit racing the idle check
            // stores a permit and the wait below resolves immediately.
            let notified = shared.notify.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            self.drain_all().await;

            if shared.token.is_cancelled() {
                return self.final_drain().await;
            }
            if !self.is_idle() {
                // Handlers emitted during the drain; go again without waiting.
                continue;
            }
            if self.handle.keep_alive_count() == 0 {
                tracing::debug!("event loop idle with no keep-alive holders; exiting");
                return Ok(());
            }

            tokio::select! {
                _ = &mut notified => {}
                _ = shared.token.cancelled() => {}
            }
        }
    }

    /// Dispatches every registered emitter's queue once, in binding order.
    /// FIFO holds per emitter; no order is promised between emitters.
    async fn drain_all(&self) {
        for inner in self.handle.live_emitters() {
            EventEmitter::from_inner(inner).dispatch_events().await;
        }
    }

    fn is_idle(&self) -> bool {
        self.handle
            .live_emitters()
            .iter()
            .all(|inner| inner.pending() == 0)
    }

    /// Post-cancellation drain, bounded by the configured grace budget.
    async fn final_drain(&self) -> Result<(), LoopError> {
        if let Some(grace) = self.cfg.grace_budget() {
            let drain_until_idle = async {
                loop {
                    self.drain_all().await;
                    if self.is_idle() {
                        break;
                    }
                }
            };
            if tokio::time::timeout(grace, drain_until_idle).await.is_ok() {
                return Ok(());
            }
        }
        let stuck: Vec<String> = self
            .handle
            .live_emitters()
            .iter()
            .filter(|inner| inner.pending() > 0)
            .map(|inner| inner.label().to_string())
            .collect();
        if stuck.is_empty() {
            Ok(())
        } else {
            tracing::warn!(?stuck, grace = ?self.cfg.grace, "shutdown grace exceeded");
            Err(LoopError::GraceExceeded {
                grace: self.cfg.grace,
                stuck,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::Handler;
    use crate::events::Event;
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    struct Collect {
        seen: Mutex<Vec<u32>>,
    }

    impl Collect {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Handler for Collect {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.kind());
        }
    }

    #[tokio::test]
    async fn test_run_drains_and_exits_without_keep_alive() {
        let event_loop = EventLoop::new(LoopConfig::default());
        let collect = Collect::new();
        let emitter = EventEmitter::new(&event_loop.handle(), "a", collect.clone());

        for kind in 0..5 {
            emitter.emit(Event::new(kind));
        }
        event_loop.run().await.unwrap();

        assert_eq!(*collect.seen.lock().unwrap(), vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_keep_alive_keeps_loop_resident() {
        let event_loop = Arc::new(EventLoop::new(LoopConfig::default()));
        let collect = Collect::new();
        let emitter = EventEmitter::new(&event_loop.handle(), "a", collect.clone());
        emitter.set_keep_alive(true);

        let running = {
            let event_loop = event_loop.clone();
            tokio::spawn(async move { event_loop.run().await })
        };

        // Emit from a foreign OS thread while the loop is resident.
        let worker = {
            let emitter = emitter.clone();
            std::thread::spawn(move || emitter.emit(Event::new(42)))
        };
        worker.join().unwrap();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!running.is_finished(), "keep-alive must hold the loop open");
        assert_eq!(*collect.seen.lock().unwrap(), vec![42]);

        emitter.set_keep_alive(false);
        running.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_queued_events_survive_keep_alive_drop() {
        let event_loop = EventLoop::new(LoopConfig::default());
        let collect = Collect::new();
        let emitter = EventEmitter::new(&event_loop.handle(), "a", collect.clone());

        emitter.set_keep_alive(true);
        for kind in 0..20 {
            emitter.emit(Event::new(kind));
        }
        emitter.set_keep_alive(false);

        event_loop.run().await.unwrap();
        assert_eq!(collect.seen.lock().unwrap().len(), 20);
    }

    #[tokio::test]
    async fn test_shutdown_grace_exceeded_reports_stuck_emitter() {
        struct Slow;

        #[async_trait]
        impl Handler for Slow {
            async fn on_event(&self, _event: &Event) {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
        }

        let event_loop = EventLoop::new(LoopConfig {
            grace: Duration::from_millis(50),
            warn_queue_depth: 0,
        });
        let emitter = EventEmitter::new(&event_loop.handle(), "stuck-emitter", Arc::new(Slow));
        emitter.set_keep_alive(true);
        emitter.emit(Event::new(1));
        emitter.emit(Event::new(2));

        event_loop.handle().shutdown();
        let err = event_loop.run().await.unwrap_err();
        match err {
            LoopError::GraceExceeded { stuck, .. } => {
                assert_eq!(stuck, vec!["stuck-emitter".to_string()]);
            }
            other => panic!("expected GraceExceeded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_refuses_concurrent_entry() {
        let event_loop = Arc::new(EventLoop::new(LoopConfig::default()));
        let emitter = EventEmitter::new(&event_loop.handle(), "a", Collect::new());
        emitter.set_keep_alive(true);

        let first = {
            let event_loop = event_loop.clone();
            tokio::spawn(async move { event_loop.run().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        let second = event_loop.run().await;
        assert!(matches!(second, Err(LoopError::AlreadyRunning)));

        emitter.set_keep_alive(false);
        first.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_loop_is_reusable_after_clean_exit() {
        let event_loop = EventLoop::new(LoopConfig::default());
        let collect = Collect::new();
        let emitter = EventEmitter::new(&event_loop.handle(), "a", collect.clone());

        emitter.emit(Event::new(1));
        event_loop.run().await.unwrap();

        emitter.emit(Event::new(2));
        event_loop.run().await.unwrap();

        assert_eq!(*collect.seen.lock().unwrap(), vec![1, 2]);
    }
}
