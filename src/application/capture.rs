//! Microphone capture use case

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{watch, Mutex};

use crate::domain::audio::AudioPayload;
use crate::domain::capture::{CaptureSession, CaptureState, InvalidStateTransition, PermissionKind};
use crate::domain::config::DEFAULT_MIN_CAPTURE_MS;
use crate::domain::error::ErrorKind;

use super::bridge::TranscriptionBridge;
use super::ports::{CaptureDevice, CaptureError, ProvisionalTranscriber};

/// Errors from the capture use case
#[derive(Debug, Error)]
pub enum CaptureUseCaseError {
    #[error("Invalid state transition: {0}")]
    InvalidState(#[from] InvalidStateTransition),

    #[error("Microphone access failed: {message}")]
    Permission {
        kind: PermissionKind,
        message: String,
    },

    #[error("Capture failed: {0}")]
    Capture(#[from] CaptureError),

    #[error("Capture too short: {actual_ms}ms recorded, at least {min_ms}ms needed")]
    TooShort { actual_ms: u64, min_ms: u64 },
}

impl CaptureUseCaseError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CaptureUseCaseError::Permission { .. } => ErrorKind::Permission,
            CaptureUseCaseError::Capture(CaptureError::Permission { .. }) => ErrorKind::Permission,
            CaptureUseCaseError::InvalidState(_) | CaptureUseCaseError::TooShort { .. } => {
                ErrorKind::Validation
            }
            CaptureUseCaseError::Capture(CaptureError::EmptyCapture) => ErrorKind::Validation,
            CaptureUseCaseError::Capture(_) => ErrorKind::Device,
        }
    }
}

/// Configuration for a capture session
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Whether to run the live transcript bridge while recording
    pub live_transcript: bool,
    /// Minimum capture length accepted for analysis
    pub min_capture_ms: u64,
    /// How often the bridge snapshots the capture
    pub transcript_interval_ms: u64,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            live_transcript: true,
            min_capture_ms: DEFAULT_MIN_CAPTURE_MS,
            transcript_interval_ms: 2000,
        }
    }
}

/// Output from a finished capture
#[derive(Debug, Clone)]
pub struct CaptureOutput {
    /// The finalized, encoded audio
    pub audio: AudioPayload,
    /// The last transcript the bridge produced, if it ran
    pub provisional_transcript: Option<String>,
}

/// Microphone capture use case.
/// Drives the session state machine around a capture device, so a
/// device handle is only ever open while the session is recording.
pub struct CaptureUseCase<D, P>
where
    D: CaptureDevice + 'static,
    P: ProvisionalTranscriber + 'static,
{
    device: Arc<D>,
    transcriber: Option<Arc<P>>,
    session: Arc<Mutex<CaptureSession>>,
    bridge: Mutex<Option<TranscriptionBridge>>,
    config: CaptureConfig,
}

impl<D, P> CaptureUseCase<D, P>
where
    D: CaptureDevice + 'static,
    P: ProvisionalTranscriber + 'static,
{
    /// Create a new capture use case instance
    pub fn new(device: Arc<D>, transcriber: Option<Arc<P>>, config: CaptureConfig) -> Self {
        Self {
            device,
            transcriber,
            session: Arc::new(Mutex::new(CaptureSession::new())),
            bridge: Mutex::new(None),
            config,
        }
    }

    /// Get current session state
    pub async fn state(&self) -> CaptureState {
        self.session.lock().await.state()
    }

    /// Start recording.
    ///
    /// The session lock is held across the device open, so concurrent
    /// starts cannot open a second stream: state is validated first,
    /// and only a successful open transitions to recording. A refused
    /// open moves the session to the permission-error state instead,
    /// from which another start may be attempted.
    pub async fn start(&self) -> Result<(), CaptureUseCaseError> {
        {
            let mut session = self.session.lock().await;
            if !session.can_start() {
                return Err(InvalidStateTransition {
                    current_state: session.state(),
                    action: "start recording".to_string(),
                }
                .into());
            }

            if let Err(err) = self.device.start().await {
                return match err.permission_kind() {
                    Some(kind) => {
                        session.fail_permission(kind)?;
                        Err(CaptureUseCaseError::Permission {
                            kind,
                            message: err.to_string(),
                        })
                    }
                    None => Err(err.into()),
                };
            }

            session.start_recording()?;
        }

        if self.config.live_transcript {
            if let Some(transcriber) = &self.transcriber {
                let bridge = TranscriptionBridge::spawn(
                    self.device.clone(),
                    transcriber.clone(),
                    Duration::from_millis(self.config.transcript_interval_ms),
                );
                *self.bridge.lock().await = Some(bridge);
            }
        }

        Ok(())
    }

    /// Stop recording, finalize the audio, and enforce the minimum
    /// capture length. Too-short captures are discarded and the
    /// session returns to idle.
    pub async fn stop(&self) -> Result<CaptureOutput, CaptureUseCaseError> {
        {
            let mut session = self.session.lock().await;
            session.stop_recording()?;
        }

        // Quiesce the bridge before finalizing so no snapshot races
        // the stop.
        let provisional_transcript = match self.bridge.lock().await.take() {
            Some(bridge) => bridge.shutdown().await,
            None => None,
        };

        let audio = match self.device.stop().await {
            Ok(audio) => audio,
            Err(err) => {
                let mut session = self.session.lock().await;
                session.abort_capture()?;
                return Err(err.into());
            }
        };

        {
            let mut session = self.session.lock().await;
            session.complete_capture()?;
        }

        if audio.duration_ms() < self.config.min_capture_ms {
            let mut session = self.session.lock().await;
            session.discard()?;
            return Err(CaptureUseCaseError::TooShort {
                actual_ms: audio.duration_ms(),
                min_ms: self.config.min_capture_ms,
            });
        }

        Ok(CaptureOutput {
            audio,
            provisional_transcript,
        })
    }

    /// Cancel recording without analysis
    pub async fn cancel(&self) -> Result<(), CaptureUseCaseError> {
        {
            let mut session = self.session.lock().await;
            session.cancel_recording()?;
        }

        if let Some(bridge) = self.bridge.lock().await.take() {
            bridge.shutdown().await;
        }

        self.device.cancel().await?;
        Ok(())
    }

    /// Acknowledge a finished capture and return the session to idle
    pub async fn discard(&self) -> Result<(), CaptureUseCaseError> {
        let mut session = self.session.lock().await;
        session.discard()?;
        Ok(())
    }

    /// Best-effort cleanup on interrupt. Stops the bridge, releases
    /// the device, and returns the session to idle regardless of the
    /// state it was in.
    pub async fn teardown(&self) {
        if let Some(bridge) = self.bridge.lock().await.take() {
            bridge.shutdown().await;
        }

        if self.device.is_recording() {
            let _ = self.device.cancel().await;
        }

        let mut session = self.session.lock().await;
        if session.is_recording() {
            let _ = session.cancel_recording();
        }
    }

    /// Subscribe to transcript updates from the running bridge
    pub async fn transcript_feed(&self) -> Option<watch::Receiver<String>> {
        self.bridge
            .lock()
            .await
            .as_ref()
            .map(|bridge| bridge.transcript_feed())
    }

    /// Subscribe to the device input level
    pub fn level_feed(&self) -> watch::Receiver<f32> {
        self.device.level_feed()
    }

    /// Get elapsed capture time in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.device.elapsed_ms()
    }

    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        self.device.is_recording()
    }
}
