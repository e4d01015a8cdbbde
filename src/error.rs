//! Error types used by the loopbridge runtime.
//!
//! The bridge itself is deliberately close to infallible: `emit` never fails
//! from the caller's point of view, engine-reported failures travel as ordinary
//! events with a failure kind, and lifecycle races degrade to silent no-ops.
//! What remains is the consumer-loop lifecycle, covered by [`LoopError`].

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the consumer loop.
///
/// These represent failures of the loop lifecycle itself, never of event
/// delivery: a queued event is either delivered or still queued, and no
/// `LoopError` implies lost or reordered events.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum LoopError {
    /// Shutdown grace period was exceeded; some emitters still held
    /// undelivered events when the final drain was cut off.
    #[error("shutdown grace {grace:?} exceeded; emitters with pending events: {stuck:?}")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Labels of emitters whose queues were not empty when time ran out.
        stuck: Vec<String>,
    },

    /// `EventLoop::run` was entered while another `run` was still active.
    ///
    /// The queue-pop side of every emitter is single-consumer; two concurrent
    /// drains would break per-emitter FIFO, so the second entry is refused.
    #[error("event loop is already running")]
    AlreadyRunning,
}

impl LoopError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use loopbridge::LoopError;
    /// use std::time::Duration;
    ///
    /// let err = LoopError::GraceExceeded { grace: Duration::from_secs(5), stuck: vec![] };
    /// assert_eq!(err.as_label(), "loop_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            LoopError::GraceExceeded { .. } => "loop_grace_exceeded",
            LoopError::AlreadyRunning => "loop_already_running",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            LoopError::GraceExceeded { grace, stuck } => {
                format!("grace exceeded after {grace:?}; stuck emitters={stuck:?}")
            }
            LoopError::AlreadyRunning => "event loop is already running".to_string(),
        }
    }
}
