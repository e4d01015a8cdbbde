//! # Media observer: stream/track lifecycle callbacks → events.
//!
//! Covers the media-plane *lifecycle* surface only: tracks starting, ending,
//! muting, and streams appearing or disappearing. Frame data itself never
//! crosses this bridge (media-plane behavior is out of scope); what crosses is
//! the fact that a track exists and is live — which, like an open channel,
//! keeps the consumer loop resident.
//!
//! Kind values sit in the `0x400` range.

use std::sync::Arc;

use crate::emitter::EventEmitter;
use crate::events::Event;
use crate::observers::target::ObserverTarget;

/// Event kinds produced by [`MediaObserver`].
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaEventKind {
    /// Payload: [`TrackInfo`].
    TrackStarted = 0x400,
    /// Payload: [`TrackInfo`].
    TrackEnded = 0x401,
    /// Payload: [`TrackInfo`].
    TrackMuted = 0x402,
    /// Payload: [`TrackInfo`].
    TrackUnmuted = 0x403,
    /// Payload: `String` (stream id).
    StreamAdded = 0x404,
    /// Payload: `String` (stream id).
    StreamRemoved = 0x405,
}

/// Identity of a media track as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackInfo {
    pub id: String,
    /// "audio" or "video", as labelled by the engine.
    pub kind: String,
}

/// Adapter for the engine's stream/track callback interface.
pub struct MediaObserver {
    target: ObserverTarget,
}

impl MediaObserver {
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

    /// A track started producing media: the native resource is live.
    pub fn on_track_started(&self, track: TrackInfo) {
        self.target.set_keep_alive(true);
        self.target
            .emit(Event::with_payload(MediaEventKind::TrackStarted as u32, track));
    }

    /// A track ended: terminal for this track's emitter.
    pub fn on_track_ended(&self, track: TrackInfo) {
        self.target.set_keep_alive(false);
        self.target
            .emit(Event::with_payload(MediaEventKind::TrackEnded as u32, track));
    }

    pub fn on_track_muted(&self, track: TrackInfo) {
        self.target
            .emit(Event::with_payload(MediaEventKind::TrackMuted as u32, track));
    }

    pub fn on_track_unmuted(&self, track: TrackInfo) {
        self.target
            .emit(Event::with_payload(MediaEventKind::TrackUnmuted as u32, track));
    }

    pub fn on_stream_added(&self, stream_id: String) {
        self.target
            .emit(Event::with_payload(MediaEventKind::StreamAdded as u32, stream_id));
    }

    pub fn on_stream_removed(&self, stream_id: String) {
        self.target.emit(Event::with_payload(
            MediaEventKind::StreamRemoved as u32,
            stream_id,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EventLoop, LoopConfig};
    use crate::emitter::Handler;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct Collect {
        seen: Mutex<Vec<Event>>,
    }

    #[async_trait]
    impl Handler for Collect {
        async fn on_event(&self, event: &Event) {
            self.seen.lock().unwrap().push(event.clone());
        }
    }

    #[tokio::test]
    async fn test_track_lifecycle_drives_keep_alive_and_events() {
        let event_loop = EventLoop::new(LoopConfig::default());
        let collect = Arc::new(Collect {
            seen: Mutex::new(Vec::new()),
        });
        let emitter = EventEmitter::new(&event_loop.handle(), "track", collect.clone());
        let observer = MediaObserver::new(emitter.clone());
        let track = TrackInfo {
            id: "t0".into(),
            kind: "audio".into(),
        };

        observer.on_track_started(track.clone());
        assert!(emitter.keep_alive());
        observer.on_track_ended(track.clone());
        assert!(!emitter.keep_alive());

        emitter.dispatch_events().await;
        let seen = collect.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].kind(), MediaEventKind::TrackStarted as u32);
        assert_eq!(seen[1].kind(), MediaEventKind::TrackEnded as u32);
        assert_eq!(seen[1].payload::<TrackInfo>(), Some(&track));
    }
}
