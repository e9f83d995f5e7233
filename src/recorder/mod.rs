//! Recording system module
//!
//! This module implements the capture-pipeline lifecycle:
//! - RecorderController owning acquisition, encoding, and cleanup
//! - the session state machine and host-facing snapshot
//! - the finished Artifact handed to the completion handler

pub mod controller;
pub mod state;

pub use controller::{CompletionHandler, RecorderController, RecorderEvent};
pub use state::{Artifact, RecorderConfig, RecorderState, SessionSnapshot};
