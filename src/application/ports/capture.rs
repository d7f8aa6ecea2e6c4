//! Capture device port interface

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::watch;

use crate::domain::audio::AudioPayload;
use crate::domain::capture::PermissionKind;

/// Capture errors
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    #[error("Microphone access failed ({kind}): {reason}")]
    Permission {
        kind: PermissionKind,
        reason: String,
    },

    #[error("Failed to start capture: {0}")]
    StartFailed(String),

    #[error("Capture failed: {0}")]
    CaptureFailed(String),

    #[error("No recording in progress")]
    NotRecording,

    #[error("Capture produced no audio")]
    EmptyCapture,
}

impl CaptureError {
    /// The permission failure kind, when this error is one
    pub fn permission_kind(&self) -> Option<PermissionKind> {
        match self {
            CaptureError::Permission { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

/// Port for a signal-controlled microphone capture device
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Open the device and start capturing.
    ///
    /// # Returns
    /// `Ok` once samples are flowing, or a `Permission` error when the
    /// device cannot be opened
    async fn start(&self) -> Result<(), CaptureError>;

    /// Stop capturing and return the finalized, encoded audio.
    async fn stop(&self) -> Result<AudioPayload, CaptureError>;

    /// Stop capturing and discard everything captured so far.
    async fn cancel(&self) -> Result<(), CaptureError>;

    /// Encode everything captured so far without stopping.
    ///
    /// # Returns
    /// An independent payload covering the capture from its beginning
    /// up to now
    async fn snapshot(&self) -> Result<AudioPayload, CaptureError>;

    /// Check if currently capturing
    fn is_recording(&self) -> bool;

    /// Get elapsed capture time in milliseconds
    fn elapsed_ms(&self) -> u64;

    /// Subscribe to the input level (RMS of recent samples, 0.0 to 1.0)
    fn level_feed(&self) -> watch::Receiver<f32>;
}
