//! Classification verdict value object

use serde::Serialize;

use super::label::Label;

/// The outcome of classifying one input.
///
/// Confidence is always within `[0.0, 1.0]`; the constructor clamps
/// whatever the model reported. Serializes with the exact field names
/// clients consume (`label`, `confidence`, `explanation`,
/// `transcription`).
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    label: Label,
    confidence: f64,
    explanation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    transcription: Option<String>,
}

impl Verdict {
    pub fn new(label: Label, confidence: f64, explanation: impl Into<String>) -> Self {
        Self {
            label,
            confidence: confidence.clamp(0.0, 1.0),
            explanation: explanation.into(),
            transcription: None,
        }
    }

    /// Fallback verdict for a model response that parsed but carried no label
    pub fn unclassified() -> Self {
        Self::new(
            Label::NormalSpeech,
            0.0,
            "Could not classify input. The model returned a valid response but missing label.",
        )
    }

    pub fn with_transcription(mut self, transcription: impl Into<String>) -> Self {
        self.transcription = Some(transcription.into());
        self
    }

    pub fn label(&self) -> Label {
        self.label
    }

    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn transcription(&self) -> Option<&str> {
        self.transcription.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_clamps_confidence_above_one() {
        let verdict = Verdict::new(Label::HateSpeech, 1.7, "overconfident");
        assert_eq!(verdict.confidence(), 1.0);
    }

    #[test]
    fn test_verdict_clamps_negative_confidence() {
        let verdict = Verdict::new(Label::NormalSpeech, -0.3, "underconfident");
        assert_eq!(verdict.confidence(), 0.0);
    }

    #[test]
    fn test_verdict_keeps_in_range_confidence() {
        let verdict = Verdict::new(Label::OffensiveLanguage, 0.92, "rude");
        assert_eq!(verdict.confidence(), 0.92);
    }

    #[test]
    fn test_unclassified_fallback() {
        let verdict = Verdict::unclassified();
        assert_eq!(verdict.label(), Label::NormalSpeech);
        assert_eq!(verdict.confidence(), 0.0);
        assert!(verdict.explanation().contains("missing label"));
        assert!(verdict.transcription().is_none());
    }

    #[test]
    fn test_with_transcription() {
        let verdict =
            Verdict::new(Label::NormalSpeech, 0.9, "fine").with_transcription("hello there");
        assert_eq!(verdict.transcription(), Some("hello there"));
    }

    #[test]
    fn test_serialization_field_names() {
        let verdict = Verdict::new(Label::HateSpeech, 0.85, "targeted slur");
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["label"], "Hate Speech");
        assert_eq!(json["confidence"], 0.85);
        assert_eq!(json["explanation"], "targeted slur");
        assert!(json.get("transcription").is_none());
    }

    #[test]
    fn test_serialization_includes_transcription_when_present() {
        let verdict = Verdict::new(Label::NormalSpeech, 0.5, "ok").with_transcription("hi");
        let json = serde_json::to_value(&verdict).unwrap();
        assert_eq!(json["transcription"], "hi");
    }
}
