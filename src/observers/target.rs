//! # Detachable emitter reference shared by every observer adapter.
//!
//! Engine objects and host-visible emitters live in two independent ownership
//! domains: the engine owns its observers by reference count, the host owns
//! emitters through its own wrapper layer. [`ObserverTarget`] is the weak,
//! detachable joint between them — after [`ObserverTarget::set_emitter`] with
//! `None`, every later engine callback becomes a silent no-op instead of a
//! use-after-free, however long the engine object outlives the wrapper.
//!
//! ## Rules
//! - Callbacks arrive on arbitrary engine threads; the target mutex is held
//!   only long enough to clone the emitter handle, never across `emit`.
//! - Detaching never touches queued events: anything emitted before the
//!   detach is still delivered.

use std::sync::{Mutex, MutexGuard};

use crate::emitter::EventEmitter;
use crate::events::Event;

/// Non-owning, detachable reference to the emitter an observer reports into.
pub struct ObserverTarget {
    emitter: Mutex<Option<EventEmitter>>,
}

impl ObserverTarget {
    /// Creates a target bound to `emitter`.
    pub fn new(emitter: EventEmitter) -> Self {
        Self {
            emitter: Mutex::new(Some(emitter)),
        }
    }

    /// Creates a target that starts detached.
    pub fn detached() -> Self {
        Self {
            emitter: Mutex::new(None),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<EventEmitter>> {
        self.emitter.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Rebinds or detaches the target. `None` turns every later callback into
    /// a silent no-op.
    pub fn set_emitter(&self, emitter: Option<EventEmitter>) {
        *self.lock() = emitter;
    }

    /// Whether a target emitter is currently attached.
    pub fn is_attached(&self) -> bool {
        self.lock().is_some()
    }

    /// Emits into the attached emitter, if any. Returns whether the event was
    /// forwarded; a detached target reports `false` and drops the event.
    pub fn emit(&self, event: Event) -> bool {
        // Clone out of the lock so emit (and its fan-out) runs unlocked.
        let Some(emitter) = self.lock().clone() else {
            tracing::trace!(kind = event.kind(), "callback after detach ignored");
            return false;
        };
        emitter.emit(event);
        true
    }

    /// Adjusts the attached emitter's keep-alive flag, if attached.
    ///
    /// Adapters flip this when the native resource crosses its "live"
    /// boundary (a channel opens, a track starts, a terminal state arrives).
    pub fn set_keep_alive(&self, keep: bool) {
        if let Some(emitter) = self.lock().clone() {
            emitter.set_keep_alive(keep);
        }
    }
}
