//! # Example: engine_threads
//!
//! Demonstrates the core bridge contract: many engine threads emit, one
//! consumer loop dispatches, in per-thread order, exactly once.
//!
//! Shows how to:
//! - Bind an [`EventEmitter`] to an [`EventLoop`] and implement [`Handler`].
//! - Emit from plain OS threads (no async on the producer side).
//! - Use keep-alive to hold the loop open while the "engine" is live.
//!
//! ## Flow
//! ```text
//! 4 × std::thread ── emit(Event) ──► emitter queue ── wake ──► EventLoop::run()
//!                                                                  │
//!                                            Handler::on_event ◄───┘
//! after the last producer exits: set_keep_alive(false) → loop drains and exits
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example engine_threads
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use loopbridge::{Event, EventEmitter, EventLoop, Handler, LoopConfig};

const THREADS: u64 = 4;
const PER_THREAD: u64 = 1000;

struct Counter {
    delivered: AtomicU64,
}

#[async_trait]
impl Handler for Counter {
    async fn on_event(&self, event: &Event) {
        let n = self.delivered.fetch_add(1, Ordering::Relaxed) + 1;
        if n % 1000 == 0 {
            let sample = event.payload::<u64>().copied().unwrap_or(0);
            println!("[loop] delivered={n} last_payload={sample}");
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
    let counter = Arc::new(Counter {
        delivered: AtomicU64::new(0),
    });
    let emitter = EventEmitter::new(&event_loop.handle(), "engine", counter.clone());

    // The "engine" is live: keep the loop resident while producers run.
    emitter.set_keep_alive(true);

    let releaser = {
        let emitter = emitter.clone();
        std::thread::spawn(move || {
            let producers: Vec<_> = (0..THREADS)
                .map(|t| {
                    let emitter = emitter.clone();
                    std::thread::spawn(move || {
                        for i in 0..PER_THREAD {
                            emitter.emit(Event::with_payload(1, t * PER_THREAD + i));
                        }
                    })
                })
                .collect();
            for p in producers {
                p.join().expect("producer thread");
            }
            // Engine shut down: the loop may exit once drained.
            emitter.set_keep_alive(false);
        })
    };

    event_loop.run().await?;
    releaser.join().expect("releaser thread");

    let total = counter.delivered.load(Ordering::Relaxed);
    println!("[main] total delivered: {total} (expected {})", THREADS * PER_THREAD);
    Ok(())
}
