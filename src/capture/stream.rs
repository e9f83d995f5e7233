//! Media stream and track model
//!
//! Tracks wrap a shared handle to a live capture source (screen, microphone).
//! A combined stream borrows track handles from its source streams instead of
//! owning copies, so releasing the combined stream's tracks is never enough on
//! its own; every source must be released independently.

use parking_lot::Mutex;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Kind of media carried by a track
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    /// Screen/display video
    Video,
    /// Microphone audio
    Audio,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Video => write!(f, "video"),
            TrackKind::Audio => write!(f, "audio"),
        }
    }
}

type EndedHandler = Box<dyn FnOnce() + Send>;

/// Shared handle to the underlying hardware capture source.
struct TrackHandle {
    live: AtomicBool,
    on_ended: Mutex<Option<EndedHandler>>,
}

/// A single media track backed by a live capture handle.
///
/// Cloning a track shares the same underlying handle; this is how a combined
/// stream borrows tracks from the streams it was assembled from.
#[derive(Clone)]
pub struct MediaTrack {
    kind: TrackKind,
    label: String,
    handle: Arc<TrackHandle>,
}

impl MediaTrack {
    /// Create a live track for a newly acquired capture source.
    pub fn new(kind: TrackKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
            handle: Arc::new(TrackHandle {
                live: AtomicBool::new(true),
                on_ended: Mutex::new(None),
            }),
        }
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the underlying capture handle is still held.
    pub fn is_live(&self) -> bool {
        self.handle.live.load(Ordering::SeqCst)
    }

    /// Release the underlying capture handle.
    ///
    /// Consumer-initiated; does not fire the ended handler.
    pub fn stop(&self) {
        self.handle.live.store(false, Ordering::SeqCst);
        self.handle.on_ended.lock().take();
    }

    /// Register a handler for the source ending on its own.
    pub fn set_ended_handler<F>(&self, handler: F)
    where
        F: FnOnce() + Send + 'static,
    {
        *self.handle.on_ended.lock() = Some(Box::new(handler));
    }

    /// Signal that the source itself ended, e.g. the user revoked screen
    /// sharing through the browser/OS chrome rather than through the
    /// recorder's own controls. Fires the ended handler at most once, and
    /// only if the track was still live.
    pub fn end_from_source(&self) {
        if self.handle.live.swap(false, Ordering::SeqCst) {
            if let Some(handler) = self.handle.on_ended.lock().take() {
                handler();
            }
        }
    }
}

impl fmt::Debug for MediaTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MediaTrack")
            .field("kind", &self.kind)
            .field("label", &self.label)
            .field("live", &self.is_live())
            .finish()
    }
}

/// A set of media tracks acquired together.
#[derive(Debug, Clone)]
pub struct MediaStream {
    label: String,
    tracks: Vec<MediaTrack>,
}

impl MediaStream {
    pub fn new(label: impl Into<String>, tracks: Vec<MediaTrack>) -> Self {
        Self {
            label: label.into(),
            tracks,
        }
    }

    /// Build the multiplexed stream for encoding: the video track(s) of
    /// `video_source` plus the audio track(s) of `audio_source`.
    ///
    /// The combined stream shares the originals' track handles; it borrows,
    /// it does not own.
    pub fn combined(
        label: impl Into<String>,
        video_source: &MediaStream,
        audio_source: &MediaStream,
    ) -> Self {
        let mut tracks: Vec<MediaTrack> =
            video_source.video_tracks().into_iter().cloned().collect();
        tracks.extend(audio_source.audio_tracks().into_iter().cloned());
        Self::new(label, tracks)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn tracks(&self) -> &[MediaTrack] {
        &self.tracks
    }

    pub fn video_tracks(&self) -> Vec<&MediaTrack> {
        self.tracks
            .iter()
            .filter(|t| t.kind() == TrackKind::Video)
            .collect()
    }

    pub fn audio_tracks(&self) -> Vec<&MediaTrack> {
        self.tracks
            .iter()
            .filter(|t| t.kind() == TrackKind::Audio)
            .collect()
    }

    /// Stop every track on this stream.
    pub fn stop_all(&self) {
        for track in &self.tracks {
            track.stop();
        }
    }

    /// Number of tracks whose capture handle is still held.
    pub fn live_track_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_live()).count()
    }
}
