//! Recording state management
//!
//! Defines the recording state machine, session configuration, the snapshot
//! handed to the host UI, and the finished artifact.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::encoder::Codec;

/// Current state of the recording session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecorderState {
    /// No recording in progress
    Idle,
    /// Currently recording
    Recording,
    /// A stop trigger fired; the artifact is being assembled
    Finalizing,
    /// A failure is being unwound; cleanup returns the machine to idle
    Errored,
}

impl Default for RecorderState {
    fn default() -> Self {
        Self::Idle
    }
}

/// Configuration for a recording session
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderConfig {
    /// Ceiling in seconds before forced auto-stop
    pub max_duration_secs: u64,

    /// Target encode bitrate in bits per second
    pub bitrate_bps: u32,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            max_duration_secs: 180,
            bitrate_bps: 1_000_000,
        }
    }
}

impl RecorderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_duration(mut self, secs: u64) -> Self {
        self.max_duration_secs = secs;
        self
    }

    pub fn with_bitrate(mut self, bps: u32) -> Self {
        self.bitrate_bps = bps;
        self
    }

    /// Closed-form size estimate for the given elapsed time. An estimate
    /// only; the true artifact size is whatever the encoder produces.
    pub fn estimated_bytes(&self, elapsed_secs: u64) -> u64 {
        (self.bitrate_bps as u64 / 8) * elapsed_secs
    }
}

/// Snapshot of the live session for the host UI
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    /// Id of the active session, if one is running
    pub session_id: Option<Uuid>,

    pub state: RecorderState,

    /// Convenience flag: `state == Recording`
    pub recording: bool,

    /// Seconds counted by the 1 Hz session timer
    pub recording_time_secs: u64,

    /// Derived size estimate in megabytes
    pub estimated_size_mb: f64,

    /// Configured ceiling in seconds
    pub max_duration_secs: u64,

    /// Last user-facing error message, if any
    pub error: Option<String>,
}

/// The finished recording handed back to the host.
///
/// `duration_secs` is the true elapsed time measured from the monotonic
/// clock at finalize, not the 1 Hz tick count, which may drift or be
/// skipped under load.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Generated name embedding the creation timestamp
    pub file_name: String,

    /// MIME type of the negotiated container/codec
    pub mime_type: &'static str,

    /// Encoded payload
    pub data: Vec<u8>,

    /// True elapsed duration in whole seconds
    pub duration_secs: u64,
}

impl Artifact {
    pub fn new(codec: Codec, data: Vec<u8>, duration_secs: u64) -> Self {
        let file_name = format!(
            "screen-recording-{}.{}",
            Utc::now().timestamp_millis(),
            codec.extension()
        );
        Self {
            file_name,
            mime_type: codec.mime_type(),
            data,
            duration_secs,
        }
    }

    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_to_three_minutes_at_one_mbps() {
        let config = RecorderConfig::default();
        assert_eq!(config.max_duration_secs, 180);
        assert_eq!(config.bitrate_bps, 1_000_000);
    }

    #[test]
    fn size_estimate_is_bitrate_over_eight_times_elapsed() {
        let config = RecorderConfig::default();
        assert_eq!(config.estimated_bytes(0), 0);
        assert_eq!(config.estimated_bytes(3), 375_000);
        assert_eq!(config.estimated_bytes(180), 22_500_000);
    }

    #[test]
    fn artifact_file_name_embeds_timestamp_and_extension() {
        let artifact = Artifact::new(Codec::Vp9, vec![0u8; 16], 3);
        assert!(artifact.file_name.starts_with("screen-recording-"));
        assert!(artifact.file_name.ends_with(".webm"));

        let stamp = artifact
            .file_name
            .trim_start_matches("screen-recording-")
            .trim_end_matches(".webm");
        assert!(stamp.parse::<i64>().is_ok());

        assert_eq!(artifact.mime_type, "video/webm;codecs=vp9");
        assert_eq!(artifact.size_bytes(), 16);
        assert_eq!(artifact.duration_secs, 3);
    }

    #[test]
    fn snapshot_serializes_camel_case_for_the_host() {
        let snapshot = SessionSnapshot {
            session_id: None,
            state: RecorderState::Idle,
            recording: false,
            recording_time_secs: 0,
            estimated_size_mb: 0.0,
            max_duration_secs: 180,
            error: None,
        };
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["state"], "idle");
        assert_eq!(json["recordingTimeSecs"], 0);
        assert_eq!(json["maxDurationSecs"], 180);
        assert!(json["estimatedSizeMb"].is_number());
    }
}
