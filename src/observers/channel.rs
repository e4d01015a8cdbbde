//! # Channel observer: data-channel callbacks → events.
//!
//! Translates channel state transitions and incoming messages into events.
//! The lifetime pattern matters here more than anywhere: a channel's engine
//! object routinely keeps firing callbacks (buffered messages, the final
//! `Closed`) after the host-visible wrapper is gone, and each of those must be
//! a silent no-op after detach.
//!
//! A channel also drives loop residency: an `Open` channel is a live native
//! resource, so its emitter keeps the consumer loop resident until the channel
//! reaches `Closed`.
//!
//! Kind values sit in the `0x300` range.

use std::sync::Arc;

use crate::emitter::EventEmitter;
use crate::events::Event;
use crate::observers::target::ObserverTarget;

/// Data-channel state, as reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Connecting,
    Open,
    Closing,
    Closed,
}

/// Event kinds produced by [`ChannelObserver`].
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelEventKind {
    /// Payload: [`ChannelState`].
    StateChange = 0x300,
    /// Payload: [`MessageData`].
    Message = 0x301,
    /// No payload.
    BufferedAmountLow = 0x302,
}

/// An incoming channel message. The bytes are an opaque payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageData {
    /// Whether the engine flagged this as binary (vs. text).
    pub binary: bool,
    pub data: Vec<u8>,
}

/// Adapter for the engine's data-channel callback interface.
pub struct ChannelObserver {
    target: ObserverTarget,
}

impl ChannelObserver {
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

    /// State transition. `Open` marks the native resource live (keep the loop
    /// resident); `Closed` is terminal and releases it.
    pub fn on_state_change(&self, state: ChannelState) {
        match state {
            ChannelState::Open => self.target.set_keep_alive(true),
            ChannelState::Closed => self.target.set_keep_alive(false),
            _ => {}
        }
        self.target
            .emit(Event::with_payload(ChannelEventKind::StateChange as u32, state));
    }

    pub fn on_message(&self, binary: bool, data: Vec<u8>) {
        self.target.emit(Event::with_payload(
            ChannelEventKind::Message as u32,
            MessageData { binary, data },
        ));
    }

    pub fn on_buffered_amount_low(&self) {
        self.target
            .emit(Event::new(ChannelEventKind::BufferedAmountLow as u32));
    }
}
