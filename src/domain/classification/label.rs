//! Classification label value object

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::domain::error::InvalidLabelError;

/// The closed set of labels a classification can produce.
///
/// The wire spelling of each label is fixed; clients key display
/// behavior (colors, icons) off these exact strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Label {
    #[serde(rename = "Hate Speech")]
    HateSpeech,
    #[serde(rename = "Offensive Language")]
    OffensiveLanguage,
    #[serde(rename = "Normal Speech")]
    NormalSpeech,
}

impl Label {
    /// All labels, in severity order
    pub const ALL: [Label; 3] = [
        Label::HateSpeech,
        Label::OffensiveLanguage,
        Label::NormalSpeech,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Label::HateSpeech => "Hate Speech",
            Label::OffensiveLanguage => "Offensive Language",
            Label::NormalSpeech => "Normal Speech",
        }
    }
}

impl Default for Label {
    fn default() -> Self {
        Label::NormalSpeech
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Label {
    type Err = InvalidLabelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "Hate Speech" => Ok(Label::HateSpeech),
            "Offensive Language" => Ok(Label::OffensiveLanguage),
            "Normal Speech" => Ok(Label::NormalSpeech),
            _ => Err(InvalidLabelError {
                input: s.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_as_str() {
        assert_eq!(Label::HateSpeech.as_str(), "Hate Speech");
        assert_eq!(Label::OffensiveLanguage.as_str(), "Offensive Language");
        assert_eq!(Label::NormalSpeech.as_str(), "Normal Speech");
    }

    #[test]
    fn test_label_from_str_valid() {
        assert_eq!("Hate Speech".parse::<Label>().unwrap(), Label::HateSpeech);
        assert_eq!(
            "Offensive Language".parse::<Label>().unwrap(),
            Label::OffensiveLanguage
        );
        assert_eq!(
            "Normal Speech".parse::<Label>().unwrap(),
            Label::NormalSpeech
        );
    }

    #[test]
    fn test_label_from_str_trims_whitespace() {
        assert_eq!(
            "  Normal Speech  ".parse::<Label>().unwrap(),
            Label::NormalSpeech
        );
    }

    #[test]
    fn test_label_from_str_invalid() {
        let err = "hate speech".parse::<Label>().unwrap_err();
        assert!(err.to_string().contains("hate speech"));
        assert!("".parse::<Label>().is_err());
        assert!("Toxic".parse::<Label>().is_err());
    }

    #[test]
    fn test_label_default_is_normal() {
        assert_eq!(Label::default(), Label::NormalSpeech);
    }

    #[test]
    fn test_label_serializes_to_wire_spelling() {
        let json = serde_json::to_string(&Label::OffensiveLanguage).unwrap();
        assert_eq!(json, "\"Offensive Language\"");
    }
}
