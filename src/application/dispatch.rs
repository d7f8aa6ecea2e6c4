//! Classification dispatch use case

use thiserror::Error;

use crate::domain::audio::AudioPayload;
use crate::domain::classification::{ClassificationRequest, Verdict};
use crate::domain::error::{EmptyRequestError, ErrorKind};

use super::ports::{BackendError, ClassificationBackend};

/// Errors from the dispatch use case
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("{0}")]
    Validation(#[from] EmptyRequestError),

    #[error("Classification failed: {0}")]
    Backend(#[from] BackendError),
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::Validation(_) => ErrorKind::Validation,
            DispatchError::Backend(err) => match err {
                BackendError::EmptyResponse | BackendError::IncompleteResponse(_) => {
                    ErrorKind::Model
                }
                _ => ErrorKind::Transport,
            },
        }
    }
}

/// Input for one classification
#[derive(Debug, Clone, Default)]
pub struct DispatchInput {
    /// Text to classify
    pub text: Option<String>,
    /// Captured audio to classify
    pub audio: Option<AudioPayload>,
}

/// Classification dispatch use case.
/// Validates the input before any network activity, so an empty
/// submission never reaches a backend.
pub struct DispatchUseCase<B>
where
    B: ClassificationBackend,
{
    backend: B,
}

impl<B> DispatchUseCase<B>
where
    B: ClassificationBackend,
{
    /// Create a new dispatch use case instance
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Validate and classify one input
    pub async fn execute(&self, input: DispatchInput) -> Result<Verdict, DispatchError> {
        let request = ClassificationRequest::new(input.text.as_deref(), input.audio)?;
        let verdict = self.backend.classify(&request).await?;
        Ok(verdict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::audio::AudioMimeType;
    use crate::domain::classification::Label;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingBackend {
        calls: AtomicUsize,
    }

    impl CountingBackend {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ClassificationBackend for CountingBackend {
        async fn classify(
            &self,
            request: &ClassificationRequest,
        ) -> Result<Verdict, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let verdict = Verdict::new(Label::NormalSpeech, 0.9, "nothing remarkable");
            Ok(match request.has_audio() {
                true => verdict.with_transcription("heard words"),
                false => verdict,
            })
        }
    }

    #[tokio::test]
    async fn classifies_text() {
        let use_case = DispatchUseCase::new(CountingBackend::new());

        let verdict = use_case
            .execute(DispatchInput {
                text: Some("hello world".to_string()),
                audio: None,
            })
            .await
            .unwrap();

        assert_eq!(verdict.label(), Label::NormalSpeech);
        assert!(verdict.transcription().is_none());
    }

    #[tokio::test]
    async fn classifies_audio_with_transcription() {
        let use_case = DispatchUseCase::new(CountingBackend::new());

        let verdict = use_case
            .execute(DispatchInput {
                text: None,
                audio: Some(AudioPayload::new(vec![1, 2], AudioMimeType::Flac, 900)),
            })
            .await
            .unwrap();

        assert_eq!(verdict.transcription(), Some("heard words"));
    }

    #[tokio::test]
    async fn empty_input_fails_without_touching_backend() {
        let backend = CountingBackend::new();
        let use_case = DispatchUseCase::new(backend);

        let err = use_case.execute(DispatchInput::default()).await.unwrap_err();

        assert!(matches!(err, DispatchError::Validation(_)));
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(use_case.backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn whitespace_text_fails_without_touching_backend() {
        let backend = CountingBackend::new();
        let use_case = DispatchUseCase::new(backend);

        let err = use_case
            .execute(DispatchInput {
                text: Some("   ".to_string()),
                audio: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, DispatchError::Validation(_)));
        assert_eq!(use_case.backend.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn backend_error_kinds() {
        assert_eq!(
            DispatchError::Backend(BackendError::EmptyResponse).kind(),
            ErrorKind::Model
        );
        assert_eq!(
            DispatchError::Backend(BackendError::RequestFailed("down".to_string())).kind(),
            ErrorKind::Transport
        );
        assert_eq!(
            DispatchError::Backend(BackendError::Upstream {
                status: 503,
                message: "overloaded".to_string()
            })
            .kind(),
            ErrorKind::Transport
        );
    }
}
