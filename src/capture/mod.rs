//! Capture sources and the platform acquisition seam
//!
//! This module provides the media stream/track model and the backend trait
//! the host binds to a real capture runtime.

pub mod stream;
pub mod traits;

pub use stream::{MediaStream, MediaTrack, TrackKind};
pub use traits::{AudioConstraints, CaptureBackend, CaptureError, DisplayConstraints};
