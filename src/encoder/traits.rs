//! Encoder seam
//!
//! The recorder drives a [`MediaEncoder`] it obtained from an
//! [`EncoderFactory`]; the encoder reports back asynchronously through
//! [`EncoderEvent`]s on a channel supplied at construction.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::capture::MediaStream;

use super::codec::Codec;

/// Errors raised while setting up or starting an encoder
#[derive(Error, Debug)]
pub enum EncoderError {
    #[error("codec not supported: {0}")]
    UnsupportedCodec(String),

    #[error("encoder failed to start: {0}")]
    StartFailed(String),
}

/// Events emitted by a running encoder
#[derive(Debug, Clone)]
pub enum EncoderEvent {
    /// An encoded chunk is available. Emitted once per timeslice while
    /// recording and once more on finalize.
    Data(Vec<u8>),

    /// The encoder finalized; no further events follow.
    Stopped,

    /// The encoder hit an internal fault; the recording cannot continue.
    Error(String),
}

/// Target configuration for a negotiated encoder
#[derive(Debug, Clone)]
pub struct EncoderSettings {
    pub codec: Codec,

    /// Target encode bitrate in bits per second
    pub bitrate_bps: u32,
}

/// A live encoder consuming a combined media stream.
pub trait MediaEncoder: Send {
    /// Begin encoding, delivering `Data` chunks every `timeslice` rather
    /// than only at the end, so partial data is never lost.
    fn start(&mut self, timeslice: Duration) -> Result<(), EncoderError>;

    /// Request finalization. The remaining `Data` events and a final
    /// `Stopped` follow on the event channel. Must be idempotent.
    fn stop(&mut self);
}

/// Builds encoders for whatever codecs the platform supports.
pub trait EncoderFactory: Send + Sync {
    /// Whether this platform can encode the given candidate.
    fn supports(&self, codec: Codec) -> bool;

    /// Build an encoder consuming `stream`, reporting on `events`.
    fn create(
        &self,
        stream: &MediaStream,
        settings: EncoderSettings,
        events: mpsc::UnboundedSender<EncoderEvent>,
    ) -> Result<Box<dyn MediaEncoder>, EncoderError>;
}
