//! Provisional transcription port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audio::AudioPayload;

/// Provisional transcription errors
#[derive(Debug, Clone, Error)]
pub enum TranscriberError {
    #[error("Transcription request failed: {0}")]
    RequestFailed(String),

    #[error("No speech recognized")]
    Empty,
}

/// Port for transcribing in-progress capture chunks.
///
/// Results are advisory. The final classification never depends on
/// them; a failed chunk is simply skipped.
#[async_trait]
pub trait ProvisionalTranscriber: Send + Sync {
    /// Transcribe a snapshot of the capture so far.
    ///
    /// # Returns
    /// The best-effort transcript of the chunk
    async fn transcribe_chunk(&self, audio: &AudioPayload) -> Result<String, TranscriberError>;
}
