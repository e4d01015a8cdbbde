//! # Connection observer: engine connection callbacks → events.
//!
//! Translates the connection-level callback interface (state changes,
//! candidate discovery, renegotiation hints, channel/track arrival) into
//! [`Event`]s on the owning connection's emitter. One event per callback, a
//! kind identifying which callback fired, and a payload where the callback
//! carries data.
//!
//! Kind values sit in the `0x100` range; negotiation, channel, media, and
//! stats adapters use disjoint ranges so a combined handler can match on raw
//! kinds without collisions.

use std::sync::Arc;

use crate::emitter::EventEmitter;
use crate::events::Event;
use crate::observers::target::ObserverTarget;

/// Signaling-side state of a connection, as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalingState {
    Stable,
    HaveLocalOffer,
    HaveRemoteOffer,
    HaveLocalAnswer,
    HaveRemoteAnswer,
    Closed,
}

/// Transport-side connectivity state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IceConnectionState {
    New,
    Checking,
    Connected,
    Completed,
    Failed,
    Disconnected,
    Closed,
}

/// Candidate-gathering progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IceGatheringState {
    New,
    Gathering,
    Complete,
}

/// Event kinds produced by [`ConnectionObserver`].
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionEventKind {
    /// Payload: [`SignalingState`].
    SignalingChange = 0x100,
    /// Payload: [`IceConnectionState`].
    ConnectionChange = 0x101,
    /// Payload: [`IceGatheringState`].
    GatheringChange = 0x102,
    /// Payload: [`IceCandidateInfo`].
    CandidateDiscovered = 0x103,
    /// No payload.
    NegotiationNeeded = 0x104,
    /// Payload: `String` (channel label).
    ChannelAdded = 0x105,
    /// Payload: `String` (track id).
    TrackAdded = 0x106,
    /// Payload: `String` (track id).
    TrackRemoved = 0x107,
    /// Payload: `String` (engine failure message). An engine-reported
    /// failure is an ordinary event, not a bridge error.
    ConnectionFailure = 0x108,
}

/// A discovered transport candidate. The encoded candidate line is opaque to
/// the bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IceCandidateInfo {
    pub sdp_mid: Option<String>,
    pub sdp_mline_index: Option<u16>,
    pub candidate: String,
}

/// Adapter for the engine's connection callback interface.
///
/// Holds only a detachable reference to its emitter; the engine object that
/// owns this observer may outlive (or predecease) the host-visible wrapper.
pub struct ConnectionObserver {
    target: ObserverTarget,
}

impl ConnectionObserver {
    /// Creates an observer reporting into `emitter`.
    pub fn new(emitter: EventEmitter) -> Arc<Self> {
        Arc::new(Self {
            target: ObserverTarget::new(emitter),
        })
    }

    /// Rebinds or detaches the observer; `None` silences all later callbacks.
    pub fn set_emitter(&self, emitter: Option<EventEmitter>) {
        self.target.set_emitter(emitter);
    }

    pub fn on_signaling_change(&self, state: SignalingState) {
        if state == SignalingState::Closed {
            // Terminal engine state: stop keeping the loop resident.
            self.target.set_keep_alive(false);
        }
        self.target.emit(Event::with_payload(
            ConnectionEventKind::SignalingChange as u32,
            state,
        ));
    }

    pub fn on_connection_change(&self, state: IceConnectionState) {
        if state == IceConnectionState::Connected {
            self.target.set_keep_alive(true);
        }
        if matches!(state, IceConnectionState::Closed | IceConnectionState::Failed) {
            self.target.set_keep_alive(false);
        }
        self.target.emit(Event::with_payload(
            ConnectionEventKind::ConnectionChange as u32,
            state,
        ));
    }

    pub fn on_gathering_change(&self, state: IceGatheringState) {
        self.target.emit(Event::with_payload(
            ConnectionEventKind::GatheringChange as u32,
            state,
        ));
    }

    pub fn on_candidate_discovered(&self, candidate: IceCandidateInfo) {
        self.target.emit(Event::with_payload(
            ConnectionEventKind::CandidateDiscovered as u32,
            candidate,
        ));
    }

    pub fn on_negotiation_needed(&self) {
        self.target
            .emit(Event::new(ConnectionEventKind::NegotiationNeeded as u32));
    }

    pub fn on_channel_added(&self, label: String) {
        self.target.emit(Event::with_payload(
            ConnectionEventKind::ChannelAdded as u32,
            label,
        ));
    }

    pub fn on_track_added(&self, track_id: String) {
        self.target.emit(Event::with_payload(
            ConnectionEventKind::TrackAdded as u32,
            track_id,
        ));
    }

    pub fn on_track_removed(&self, track_id: String) {
        self.target.emit(Event::with_payload(
            ConnectionEventKind::TrackRemoved as u32,
            track_id,
        ));
    }

    pub fn on_failure(&self, message: String) {
        self.target.emit(Event::with_payload(
            ConnectionEventKind::ConnectionFailure as u32,
            message,
        ));
    }
}
