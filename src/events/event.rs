//! # Immutable events carried through the bridge.
//!
//! An [`Event`] is an opaquely-typed payload tagged with an integer kind. The
//! bridge never interprets kinds beyond routing; the per-feature kind enums
//! live with the observer adapters that produce them.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically at construction time. `seq` reflects *creation* order, not
//! delivery order; per-emitter delivery order is guaranteed by the emitter's
//! queue, and `seq` exists for diagnostics and test assertions.
//!
//! ## Payload contract
//! The payload is set once at construction and is immutable thereafter. It is
//! shared by `Arc`, so cloning an event (listener fan-out clones once per
//! listener) never copies the payload. Extracting a payload with the wrong
//! type is a programmer defect: it asserts in debug builds and degrades to
//! `None` (with a `warn!`) in release builds. It never corrupts the queue.
//!
//! ## Example
//! ```rust
//! use loopbridge::Event;
//!
//! let ev = Event::with_payload(7, "hello".to_string());
//!
//! assert_eq!(ev.kind(), 7);
//! assert!(ev.has_payload());
//! assert_eq!(ev.payload::<String>().map(String::as_str), Some("hello"));
//! ```

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;

/// Global sequence counter for event ordering diagnostics.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Immutable tagged value passed through the bridge.
///
/// Cheap to clone: the optional payload sits behind an `Arc`, so fan-out to N
/// listeners costs N reference-count bumps, never N payload copies.
#[derive(Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    seq: u64,
    /// Integer event kind; opaque to the bridge.
    kind: u32,
    /// Optional payload, set at construction, immutable thereafter.
    payload: Option<Arc<dyn Any + Send + Sync>>,
}

impl Event {
    /// Creates a payload-less event of the given kind.
    pub fn new(kind: u32) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            kind,
            payload: None,
        }
    }

    /// Creates an event carrying one strongly-typed payload value.
    pub fn with_payload<T: Any + Send + Sync>(kind: u32, payload: T) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            kind,
            payload: Some(Arc::new(payload)),
        }
    }

    /// Integer kind this event was constructed with.
    #[inline]
    pub fn kind(&self) -> u32 {
        self.kind
    }

    /// Creation-order sequence number.
    #[inline]
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// Whether this event was constructed with a payload.
    #[inline]
    pub fn has_payload(&self) -> bool {
        self.payload.is_some()
    }

    /// Borrows the payload as `T`.
    ///
    /// Returns `None` if the event has no payload. A payload of a *different*
    /// type is a programmer defect: `debug_assert!` in debug builds, `warn!`
    /// plus `None` in release builds.
    pub fn payload<T: Any + Send + Sync>(&self) -> Option<&T> {
        let raw = self.payload.as_deref()?;
        let cast = raw.downcast_ref::<T>();
        if cast.is_none() {
            debug_assert!(
                false,
                "payload type mismatch on event kind={}: requested {}",
                self.kind,
                std::any::type_name::<T>(),
            );
            tracing::warn!(
                kind = self.kind,
                requested = std::any::type_name::<T>(),
                "payload type mismatch; returning None"
            );
        }
        cast
    }

    /// Clones the payload `Arc` without touching its type.
    ///
    /// Useful when a handler only forwards the event and never inspects it.
    pub fn payload_raw(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        self.payload.clone()
    }
}

impl std::fmt::Debug for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Event")
            .field("seq", &self.seq)
            .field("kind", &self.kind)
            .field("has_payload", &self.has_payload())
            .finish()
    }
}
