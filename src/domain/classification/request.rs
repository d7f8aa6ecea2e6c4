//! Classification request value object

use crate::domain::audio::AudioPayload;
use crate::domain::error::EmptyRequestError;

/// A validated classification input: text, audio, or both.
///
/// Construction is the validation point. Whitespace-only text counts
/// as absent, so a request can never reach a backend with nothing to
/// classify.
#[derive(Debug, Clone)]
pub struct ClassificationRequest {
    text: Option<String>,
    audio: Option<AudioPayload>,
}

impl ClassificationRequest {
    pub fn new(
        text: Option<&str>,
        audio: Option<AudioPayload>,
    ) -> Result<Self, EmptyRequestError> {
        let text = text
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from);

        if text.is_none() && audio.is_none() {
            return Err(EmptyRequestError);
        }

        Ok(Self { text, audio })
    }

    pub fn from_text(text: &str) -> Result<Self, EmptyRequestError> {
        Self::new(Some(text), None)
    }

    pub fn from_audio(audio: AudioPayload) -> Result<Self, EmptyRequestError> {
        Self::new(None, Some(audio))
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn audio(&self) -> Option<&AudioPayload> {
        self.audio.as_ref()
    }

    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }
}
