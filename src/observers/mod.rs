//! # Observer adapters: engine callbacks → bridge events.
//!
//! One adapter per engine feature, all sharing a single lifetime pattern: the
//! adapter holds only a detachable, non-owning reference to the emitter it
//! reports into ([`ObserverTarget`]). The engine owns the adapter by
//! reference count; the host owns the emitter through its own wrapper layer.
//! Neither domain ever frees the other's memory — severing the joint is just
//! [`set_emitter(None)`](ObserverTarget::set_emitter), after which late engine
//! callbacks fall silent.
//!
//! ## Architecture
//! ```text
//! Engine threads:                              Bridge:
//!   ConnectionObserver ── on_candidate ──► conn_emitter.emit(CandidateDiscovered)
//!   NegotiationObserver ── on_offer ─────► forwarder ──► conn_emitter (fan-out)
//!   ChannelObserver ── on_message ───────► chan_emitter.emit(Message)
//!   MediaObserver ── on_track_started ───► track_emitter.emit(TrackStarted)
//!   StatsObserver ── on_report_ready ────► stats target
//! ```
//!
//! ## Contract (every adapter)
//! - one callback → exactly one event, kind identifying the callback, payload
//!   only where the callback carries data;
//! - engine-reported failures are events with a failure kind, not errors;
//! - after detach, callbacks are silent no-ops — no crash, no delivered event.
//!
//! Kind ranges are disjoint per feature: connection `0x100`, negotiation
//! `0x200`, channel `0x300`, media `0x400`, stats `0x500`. The bridge itself
//! never interprets them.

mod channel;
mod connection;
mod media;
mod negotiation;
mod stats;
mod target;

pub use channel::{ChannelEventKind, ChannelObserver, ChannelState, MessageData};
pub use connection::{
    ConnectionEventKind, ConnectionObserver, IceCandidateInfo, IceConnectionState,
    IceGatheringState, SignalingState,
};
pub use media::{MediaEventKind, MediaObserver, TrackInfo};
pub use negotiation::{NegotiationEventKind, NegotiationObserver, SessionDescription};
pub use stats::{StatsEventKind, StatsObserver};
pub use target::ObserverTarget;
