//! Recorder controller
//!
//! Owns the capture lifecycle: acquires the display and microphone streams,
//! negotiates an encoder, drives the timed session, assembles the final
//! artifact, and releases every acquired resource on every exit path
//! (explicit stop, auto-stop, screen-share revocation, encoder fault, or
//! owner teardown).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};
use tokio::sync::{broadcast, mpsc};
use tokio::time::{Instant, MissedTickBehavior};
use uuid::Uuid;

use crate::capture::{AudioConstraints, CaptureBackend, DisplayConstraints, MediaStream};
use crate::encoder::{
    negotiate, Codec, EncoderEvent, EncoderFactory, EncoderSettings, MediaEncoder,
};
use crate::utils::error::{RecorderError, RecorderResult};

use super::state::{Artifact, RecorderConfig, RecorderState, SessionSnapshot};

/// Cadence at which the encoder is asked to deliver chunks, so partial data
/// is never lost if the session is interrupted.
const CHUNK_TIMESLICE: Duration = Duration::from_secs(1);

/// Events emitted during a recording session
#[derive(Debug, Clone)]
pub enum RecorderEvent {
    /// Recording started
    Started { session_id: Uuid },
    /// One second of recording elapsed
    Tick {
        elapsed_secs: u64,
        estimated_bytes: u64,
    },
    /// Recording hit the configured ceiling; completion still follows
    AutoStopped,
    /// The artifact was delivered to the completion handler
    Completed {
        file_name: String,
        duration_secs: u64,
    },
    /// Recording failed; no artifact was delivered
    Error(String),
}

/// Invoked exactly once per successful session with the final artifact and
/// the true elapsed duration in seconds.
pub type CompletionHandler = Arc<dyn Fn(Artifact, u64) + Send + Sync>;

/// Shared session counters and state, readable from the host at any time.
struct Shared {
    state: RwLock<RecorderState>,
    session_id: RwLock<Option<Uuid>>,
    elapsed_secs: AtomicU64,
    estimated_bytes: AtomicU64,
    error: RwLock<Option<String>>,
}

impl Shared {
    fn new() -> Self {
        Self {
            state: RwLock::new(RecorderState::Idle),
            session_id: RwLock::new(None),
            elapsed_secs: AtomicU64::new(0),
            estimated_bytes: AtomicU64::new(0),
            error: RwLock::new(None),
        }
    }

    /// Zero the counters and return to idle. The error field is left in
    /// place; it records the last user-facing failure.
    fn reset(&self) {
        self.elapsed_secs.store(0, Ordering::Relaxed);
        self.estimated_bytes.store(0, Ordering::Relaxed);
        *self.session_id.write() = None;
        *self.state.write() = RecorderState::Idle;
    }
}

/// The three live sources held while recording.
///
/// The combined stream borrows tracks from the other two; stopping it does
/// not guarantee the originals are released, so all three are stopped
/// independently.
#[derive(Clone)]
struct SessionStreams {
    display: MediaStream,
    microphone: MediaStream,
    combined: MediaStream,
}

impl SessionStreams {
    fn release(&self) {
        self.display.stop_all();
        self.microphone.stop_all();
        self.combined.stop_all();
    }
}

struct ActiveSession {
    stop_tx: mpsc::UnboundedSender<()>,
    streams: SessionStreams,
    task: tokio::task::JoinHandle<()>,
}

/// Drives the capture lifecycle and reports to the host through a
/// completion handler plus a broadcast event stream.
pub struct RecorderController {
    config: RecorderConfig,
    backend: Arc<dyn CaptureBackend>,
    encoders: Arc<dyn EncoderFactory>,
    on_complete: CompletionHandler,
    shared: Arc<Shared>,
    active: Mutex<Option<ActiveSession>>,
    start_lock: tokio::sync::Mutex<()>,
    event_tx: broadcast::Sender<RecorderEvent>,
}

impl RecorderController {
    pub fn new(
        config: RecorderConfig,
        backend: Arc<dyn CaptureBackend>,
        encoders: Arc<dyn EncoderFactory>,
        on_complete: CompletionHandler,
    ) -> Self {
        let (event_tx, _) = broadcast::channel(100);
        Self {
            config,
            backend,
            encoders,
            on_complete,
            shared: Arc::new(Shared::new()),
            active: Mutex::new(None),
            start_lock: tokio::sync::Mutex::new(()),
            event_tx,
        }
    }

    /// Subscribe to session events
    pub fn subscribe(&self) -> broadcast::Receiver<RecorderEvent> {
        self.event_tx.subscribe()
    }

    pub fn state(&self) -> RecorderState {
        *self.shared.state.read()
    }

    pub fn is_recording(&self) -> bool {
        self.state() == RecorderState::Recording
    }

    /// Seconds counted by the 1 Hz session timer
    pub fn recording_time(&self) -> u64 {
        self.shared.elapsed_secs.load(Ordering::Relaxed)
    }

    /// Derived size estimate in bytes
    pub fn estimated_bytes(&self) -> u64 {
        self.shared.estimated_bytes.load(Ordering::Relaxed)
    }

    /// Derived size estimate in megabytes
    pub fn estimated_size_mb(&self) -> f64 {
        self.estimated_bytes() as f64 / 1_000_000.0
    }

    pub fn max_duration(&self) -> u64 {
        self.config.max_duration_secs
    }

    /// Last user-facing error message
    pub fn error(&self) -> Option<String> {
        self.shared.error.read().clone()
    }

    /// Bundle of the host-facing outputs
    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state();
        SessionSnapshot {
            session_id: *self.shared.session_id.read(),
            state,
            recording: state == RecorderState::Recording,
            recording_time_secs: self.recording_time(),
            estimated_size_mb: self.estimated_size_mb(),
            max_duration_secs: self.config.max_duration_secs,
            error: self.error(),
        }
    }

    /// Start a recording session.
    ///
    /// Acquires the display and microphone sources in sequence, builds the
    /// combined stream, negotiates a codec, and starts the encoder plus the
    /// 1 Hz session timer. A failure anywhere releases whatever was already
    /// acquired and leaves the controller idle with the error recorded.
    pub async fn start_recording(&self) -> RecorderResult<()> {
        let _guard = self.start_lock.lock().await;

        if *self.shared.state.read() != RecorderState::Idle {
            return Err(RecorderError::AlreadyRecording);
        }
        *self.shared.error.write() = None;

        let display = match self
            .backend
            .acquire_display(&DisplayConstraints::default())
            .await
        {
            Ok(stream) => stream,
            Err(err) => return Err(self.abort_start(&[], err.into())),
        };

        let microphone = match self
            .backend
            .acquire_microphone(&AudioConstraints::default())
            .await
        {
            Ok(stream) => stream,
            Err(err) => return Err(self.abort_start(&[&display], err.into())),
        };

        let combined = MediaStream::combined("recording", &display, &microphone);

        let Some(codec) = negotiate(self.encoders.as_ref()) else {
            return Err(self.abort_start(
                &[&display, &microphone, &combined],
                RecorderError::UnsupportedPlatform,
            ));
        };

        let settings = EncoderSettings {
            codec,
            bitrate_bps: self.config.bitrate_bps,
        };
        let (encoder_tx, encoder_rx) = mpsc::unbounded_channel();
        let mut encoder = match self.encoders.create(&combined, settings, encoder_tx) {
            Ok(encoder) => encoder,
            Err(err) => {
                return Err(self.abort_start(&[&display, &microphone, &combined], err.into()))
            }
        };
        if let Err(err) = encoder.start(CHUNK_TIMESLICE) {
            return Err(self.abort_start(&[&display, &microphone, &combined], err.into()));
        }

        let (stop_tx, stop_rx) = mpsc::unbounded_channel();

        // The user revoking screen share through the browser/OS chrome ends
        // the display video track; treat it exactly like an explicit stop.
        for track in display.video_tracks() {
            let stop = stop_tx.clone();
            track.set_ended_handler(move || {
                let _ = stop.send(());
            });
        }

        let session_id = Uuid::new_v4();
        let started_at = Instant::now();
        let streams = SessionStreams {
            display,
            microphone,
            combined,
        };

        *self.shared.session_id.write() = Some(session_id);
        *self.shared.state.write() = RecorderState::Recording;
        let _ = self.event_tx.send(RecorderEvent::Started { session_id });
        tracing::info!(%session_id, codec = codec.mime_type(), "recording started");

        let driver = SessionDriver {
            config: self.config.clone(),
            codec,
            shared: self.shared.clone(),
            streams: streams.clone(),
            on_complete: self.on_complete.clone(),
            event_tx: self.event_tx.clone(),
            started_at,
        };
        let task = tokio::spawn(driver.run(encoder, encoder_rx, stop_rx));

        *self.active.lock() = Some(ActiveSession {
            stop_tx,
            streams,
            task,
        });

        Ok(())
    }

    /// Request finalization of the running session.
    ///
    /// Cooperative: the encoder's own end-of-stream event completes the
    /// session. A no-op when nothing is recording.
    pub fn stop_recording(&self) {
        if *self.shared.state.read() != RecorderState::Recording {
            tracing::debug!("stop requested while not recording, ignoring");
            return;
        }
        if let Some(active) = self.active.lock().as_ref() {
            let _ = active.stop_tx.send(());
        }
    }

    /// Owner-initiated teardown.
    ///
    /// Bypasses the graceful finalize (the artifact is no longer wanted),
    /// cancels the session timer, releases every acquired source, and zeroes
    /// the counters. Safe to call repeatedly and in any state.
    pub fn cleanup(&self) {
        if let Some(active) = self.active.lock().take() {
            tracing::debug!("tearing down recorder session");
            active.task.abort();
            active.streams.release();
        }
        self.shared.reset();
    }

    fn abort_start(&self, acquired: &[&MediaStream], err: RecorderError) -> RecorderError {
        *self.shared.state.write() = RecorderState::Errored;
        for stream in acquired {
            stream.stop_all();
        }
        *self.shared.error.write() = Some(err.user_message());
        tracing::warn!(code = err.code(), "failed to start recording: {err}");
        self.shared.reset();
        err
    }
}

impl Drop for RecorderController {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Per-session task multiplexing the 1 Hz timer, the encoder's event
/// channel, and stop requests.
struct SessionDriver {
    config: RecorderConfig,
    codec: Codec,
    shared: Arc<Shared>,
    streams: SessionStreams,
    on_complete: CompletionHandler,
    event_tx: broadcast::Sender<RecorderEvent>,
    started_at: Instant,
}

impl SessionDriver {
    async fn run(
        self,
        mut encoder: Box<dyn MediaEncoder>,
        mut encoder_rx: mpsc::UnboundedReceiver<EncoderEvent>,
        mut stop_rx: mpsc::UnboundedReceiver<()>,
    ) {
        let period = Duration::from_secs(1);
        let mut ticker = tokio::time::interval_at(self.started_at + period, period);
        // Ticks lost under load are skipped, not replayed; the delivered
        // duration comes from the wall clock, not this counter.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let mut chunks: Vec<Vec<u8>> = Vec::new();
        let mut auto_stopped = false;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let elapsed = self.shared.elapsed_secs.fetch_add(1, Ordering::Relaxed) + 1;
                    let estimated = self.config.estimated_bytes(elapsed);
                    self.shared.estimated_bytes.store(estimated, Ordering::Relaxed);
                    let _ = self.event_tx.send(RecorderEvent::Tick {
                        elapsed_secs: elapsed,
                        estimated_bytes: estimated,
                    });
                    if elapsed >= self.config.max_duration_secs && !auto_stopped {
                        auto_stopped = true;
                        tracing::info!(elapsed, "maximum duration reached, stopping");
                        let _ = self.event_tx.send(RecorderEvent::AutoStopped);
                        encoder.stop();
                    }
                }
                Some(_) = stop_rx.recv() => {
                    encoder.stop();
                }
                event = encoder_rx.recv() => match event {
                    Some(EncoderEvent::Data(chunk)) => chunks.push(chunk),
                    Some(EncoderEvent::Stopped) => {
                        self.finalize(chunks);
                        return;
                    }
                    Some(EncoderEvent::Error(message)) => {
                        self.fail(&message);
                        return;
                    }
                    None => {
                        self.fail("encoder event channel closed");
                        return;
                    }
                },
            }
        }
    }

    /// End-of-stream: assemble the artifact, deliver it, then release.
    /// The completion handler runs to completion before any track is
    /// released.
    fn finalize(&self, chunks: Vec<Vec<u8>>) {
        *self.shared.state.write() = RecorderState::Finalizing;
        let duration_secs = self.started_at.elapsed().as_secs_f64().round() as u64;
        let artifact = Artifact::new(self.codec, chunks.concat(), duration_secs);
        tracing::info!(
            file = %artifact.file_name,
            duration_secs,
            size_bytes = artifact.size_bytes(),
            "recording finalized"
        );
        let _ = self.event_tx.send(RecorderEvent::Completed {
            file_name: artifact.file_name.clone(),
            duration_secs,
        });
        (self.on_complete)(artifact, duration_secs);
        self.streams.release();
        self.shared.reset();
    }

    /// Encoder fault: record the error, discard partial data, release.
    /// The completion handler is not invoked.
    fn fail(&self, reason: &str) {
        let err = RecorderError::Encoding(reason.to_string());
        tracing::error!("encoder fault: {reason}");
        *self.shared.state.write() = RecorderState::Errored;
        *self.shared.error.write() = Some(err.user_message());
        let _ = self.event_tx.send(RecorderEvent::Error(err.user_message()));
        self.streams.release();
        self.shared.reset();
    }
}
