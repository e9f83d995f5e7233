//! Capture trait definitions
//!
//! Platform-agnostic seam for acquiring capture sources. The recorder only
//! ever talks to a [`CaptureBackend`], so the whole lifecycle is testable
//! without a browser or OS capture runtime behind it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::stream::MediaStream;

/// Errors raised while acquiring a capture source
#[derive(Error, Debug, Clone)]
pub enum CaptureError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("display capture is not supported in this environment")]
    Unsupported,

    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("capture failed: {0}")]
    Failed(String),
}

/// Requested properties for the display (screen) capture.
///
/// Defaults match what the recorder asks for: a video-only surface at an
/// ideal 1280x720 and 24 fps, with no embedded system audio.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayConstraints {
    /// Ideal capture width in pixels
    pub ideal_width: u32,

    /// Ideal capture height in pixels
    pub ideal_height: u32,

    /// Ideal capture frame rate
    pub ideal_frame_rate: u32,

    /// Whether to also capture system audio from the shared surface
    pub capture_system_audio: bool,
}

impl Default for DisplayConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 1280,
            ideal_height: 720,
            ideal_frame_rate: 24,
            capture_system_audio: false,
        }
    }
}

/// Requested processing for the microphone capture.
///
/// All three stages default to enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
}

impl Default for AudioConstraints {
    fn default() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
        }
    }
}

/// Acquisition seam for the two capture sources.
///
/// Both calls may suspend on a user permission prompt and either may fail;
/// the recorder treats a failure of either as a total abort.
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Acquire a video-only stream of the display surface being shared.
    async fn acquire_display(
        &self,
        constraints: &DisplayConstraints,
    ) -> Result<MediaStream, CaptureError>;

    /// Acquire an audio-only stream of the default microphone.
    async fn acquire_microphone(
        &self,
        constraints: &AudioConstraints,
    ) -> Result<MediaStream, CaptureError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_constraints_default_to_720p24() {
        let c = DisplayConstraints::default();
        assert_eq!(c.ideal_width, 1280);
        assert_eq!(c.ideal_height, 720);
        assert_eq!(c.ideal_frame_rate, 24);
        assert!(!c.capture_system_audio);
    }

    #[test]
    fn audio_constraints_default_all_processing_on() {
        let c = AudioConstraints::default();
        assert!(c.echo_cancellation);
        assert!(c.noise_suppression);
        assert!(c.auto_gain_control);
    }
}
