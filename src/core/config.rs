//! # Consumer-loop configuration.
//!
//! Provides [`LoopConfig`] — centralized settings for an
//! [`EventLoop`](crate::EventLoop).
//!
//! ## Sentinel values
//! - `grace = 0s` → no final-drain budget on shutdown (cut off immediately)
//! - `warn_queue_depth = 0` → queue-depth warning disabled

use std::time::Duration;

/// Configuration for one consumer loop.
///
/// ## Field semantics
/// - `grace`: budget for the final drain after
///   [`LoopHandle::shutdown`](crate::LoopHandle::shutdown); exceeding it
///   yields `LoopError::GraceExceeded` with the labels of emitters still
///   holding events.
/// - `warn_queue_depth`: emit a `warn!` the first time any emitter's queue
///   crosses this depth (a stalled consumer loop is the usual cause). The
///   queue itself is unbounded; this is a diagnostic, not a limit.
#[derive(Clone, Debug)]
pub struct LoopConfig {
    /// Maximum time to spend draining after shutdown is requested.
    ///
    /// When the loop's token is cancelled:
    /// - every registered emitter is drained one final time
    /// - the drain is bounded by `grace`
    /// - overrun returns `LoopError::GraceExceeded`
    pub grace: Duration,

    /// Per-emitter queue depth that triggers a one-shot warning.
    ///
    /// - `0` = disabled
    /// - `n > 0` = `warn!` once when a queue first reaches `n` entries
    ///   (re-armed after the queue drains empty)
    pub warn_queue_depth: usize,
}

impl LoopConfig {
    /// Returns the shutdown drain budget as an `Option`.
    ///
    /// - `None` → no budget, cut off immediately
    /// - `Some(d)` → drain for at most `d`
    #[inline]
    pub fn grace_budget(&self) -> Option<Duration> {
        if self.grace == Duration::ZERO {
            None
        } else {
            Some(self.grace)
        }
    }
}

impl Default for LoopConfig {
    /// Default configuration:
    ///
    /// - `grace = 10s` (enough for slow handlers to finish a backlog)
    /// - `warn_queue_depth = 1024` (flags a stalled loop without bounding it)
    fn default() -> Self {
        Self {
            grace: Duration::from_secs(10),
            warn_queue_depth: 1024,
        }
    }
}
