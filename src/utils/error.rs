//! Error types and handling
//!
//! Every failure class the recorder can hit, with the user-facing message
//! shown on the session's error field. Nothing here is fatal to the host;
//! all of these are handled locally with a forced cleanup.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::capture::CaptureError;
use crate::encoder::EncoderError;

/// Recorder-wide error type
#[derive(Error, Debug)]
pub enum RecorderError {
    #[error("screen recording permission was denied")]
    PermissionDenied,

    #[error("this environment does not support screen recording")]
    UnsupportedPlatform,

    #[error("failed to acquire capture sources: {0}")]
    Acquisition(String),

    #[error("encoding failed: {0}")]
    Encoding(String),

    #[error("a recording is already in progress")]
    AlreadyRecording,
}

impl RecorderError {
    /// Stable code for host-side branching
    pub fn code(&self) -> &'static str {
        match self {
            RecorderError::PermissionDenied => "PERMISSION_DENIED",
            RecorderError::UnsupportedPlatform => "UNSUPPORTED_PLATFORM",
            RecorderError::Acquisition(_) => "ACQUISITION_FAILURE",
            RecorderError::Encoding(_) => "ENCODING_FAILURE",
            RecorderError::AlreadyRecording => "ALREADY_RECORDING",
        }
    }

    /// Message shown to the end user on the session's error field
    pub fn user_message(&self) -> String {
        match self {
            RecorderError::PermissionDenied => {
                "Screen recording permission is required. Please allow screen sharing and try again."
            }
            RecorderError::UnsupportedPlatform => {
                "Your environment does not support screen recording."
            }
            RecorderError::Acquisition(_) => {
                "Could not start recording. Please check your screen and microphone and try again."
            }
            RecorderError::Encoding(_) => "Recording failed. Please try again.",
            RecorderError::AlreadyRecording => "A recording is already in progress.",
        }
        .to_string()
    }
}

impl From<CaptureError> for RecorderError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::PermissionDenied(_) => RecorderError::PermissionDenied,
            CaptureError::Unsupported => RecorderError::UnsupportedPlatform,
            other => RecorderError::Acquisition(other.to_string()),
        }
    }
}

impl From<EncoderError> for RecorderError {
    fn from(err: EncoderError) -> Self {
        RecorderError::Encoding(err.to_string())
    }
}

/// Error response for the host UI
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}

impl From<&RecorderError> for ErrorResponse {
    fn from(error: &RecorderError) -> Self {
        ErrorResponse {
            code: error.code().to_string(),
            message: error.user_message(),
        }
    }
}

/// Result type alias using RecorderError
pub type RecorderResult<T> = Result<T, RecorderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_errors_classify_into_the_taxonomy() {
        let denied: RecorderError = CaptureError::PermissionDenied("display".to_string()).into();
        assert!(matches!(denied, RecorderError::PermissionDenied));

        let unsupported: RecorderError = CaptureError::Unsupported.into();
        assert!(matches!(unsupported, RecorderError::UnsupportedPlatform));

        let failed: RecorderError = CaptureError::Failed("device busy".to_string()).into();
        assert!(matches!(failed, RecorderError::Acquisition(_)));
    }

    #[test]
    fn every_class_has_a_user_message_and_code() {
        let errors = [
            RecorderError::PermissionDenied,
            RecorderError::UnsupportedPlatform,
            RecorderError::Acquisition("x".to_string()),
            RecorderError::Encoding("x".to_string()),
            RecorderError::AlreadyRecording,
        ];
        for err in errors {
            assert!(!err.user_message().is_empty());
            assert!(!err.code().is_empty());
        }
    }

    #[test]
    fn error_response_serializes_code_and_message() {
        let response: ErrorResponse = (&RecorderError::PermissionDenied).into();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["code"], "PERMISSION_DENIED");
        assert!(json["message"].as_str().unwrap().contains("permission"));
    }
}
