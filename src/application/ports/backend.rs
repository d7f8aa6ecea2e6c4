//! Classification backend port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::audio::AudioPayload;
use crate::domain::classification::{ClassificationRequest, Verdict};

/// Backend errors
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("Empty model response")]
    EmptyResponse,

    #[error("Model response missing required fields: {0}")]
    IncompleteResponse(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("API error: {0}")]
    Api(String),

    /// Non-success HTTP response. The message carries whatever status
    /// context the caller wants displayed; `status` drives retry and
    /// gateway mapping decisions.
    #[error("{message}")]
    Upstream { status: u16, message: String },
}

impl BackendError {
    /// Whether a retry has any chance of succeeding.
    /// Client mistakes and model-content failures are terminal.
    pub fn is_transient(&self) -> bool {
        match self {
            BackendError::RequestFailed(_) | BackendError::RateLimited => true,
            BackendError::Upstream { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

/// Port for classifying a request into a verdict
#[async_trait]
pub trait ClassificationBackend: Send + Sync {
    /// Classify text, audio, or both.
    ///
    /// # Returns
    /// The verdict, or an error when the backend could not produce one
    async fn classify(&self, request: &ClassificationRequest) -> Result<Verdict, BackendError>;
}

/// Structured description of an uploaded recording
#[derive(Debug, Clone)]
pub struct FileAnalysis {
    pub transcription: String,
    pub summary: String,
    pub intent: String,
    pub key_points: Vec<String>,
    pub embedding: Vec<f32>,
}

/// Port for transcribing and summarizing a whole recording
#[async_trait]
pub trait FileAnalyzer: Send + Sync {
    async fn analyze(&self, audio: &AudioPayload) -> Result<FileAnalysis, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        assert!(BackendError::RateLimited.is_transient());
        assert!(BackendError::RequestFailed("connection refused".to_string()).is_transient());
        assert!(BackendError::Upstream {
            status: 503,
            message: "overloaded".to_string()
        }
        .is_transient());
        assert!(BackendError::Upstream {
            status: 429,
            message: "slow down".to_string()
        }
        .is_transient());
    }

    #[test]
    fn test_terminal_errors() {
        assert!(!BackendError::InvalidApiKey.is_transient());
        assert!(!BackendError::EmptyResponse.is_transient());
        assert!(!BackendError::IncompleteResponse("label".to_string()).is_transient());
        assert!(!BackendError::Api("blocked".to_string()).is_transient());
        assert!(!BackendError::Upstream {
            status: 400,
            message: "bad request".to_string()
        }
        .is_transient());
    }
}
