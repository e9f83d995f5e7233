//! Ticket Recorder - screen and microphone capture for support tickets.
//!
//! This crate implements the recording pipeline a ticketing UI drives to
//! attach a screen recording to a ticket: it acquires a display capture and
//! a microphone capture, multiplexes them into one encoded recording,
//! enforces a maximum duration with auto-stop, estimates output size while
//! recording, and releases every acquired source no matter how the session
//! ends.
//!
//! The host supplies the platform bindings (a [`CaptureBackend`] and an
//! [`EncoderFactory`]) and a completion handler, then drives a
//! [`RecorderController`].

pub mod capture;
pub mod encoder;
pub mod recorder;
pub mod utils;

pub use capture::{
    AudioConstraints, CaptureBackend, CaptureError, DisplayConstraints, MediaStream, MediaTrack,
    TrackKind,
};
pub use encoder::{
    Codec, EncoderError, EncoderEvent, EncoderFactory, EncoderSettings, MediaEncoder,
};
pub use recorder::{
    Artifact, CompletionHandler, RecorderConfig, RecorderController, RecorderEvent, RecorderState,
    SessionSnapshot,
};
pub use utils::error::{ErrorResponse, RecorderError, RecorderResult};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing for hosts that have not installed their own
/// subscriber. Safe to call more than once.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ticket_recorder=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
