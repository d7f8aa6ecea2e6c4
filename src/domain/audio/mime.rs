//! Audio MIME type value object

use std::fmt;
use std::str::FromStr;

use crate::domain::error::UnsupportedMimeError;

/// Supported audio container formats, identified by MIME type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioMimeType {
    WebmOpus,
    Webm,
    Mp4,
    Ogg,
    Wav,
    Flac,
    Mp3,
}

impl AudioMimeType {
    /// Capture formats in preference order; the first one a device
    /// supports wins.
    pub const PREFERRED: [AudioMimeType; 4] = [
        AudioMimeType::WebmOpus,
        AudioMimeType::Webm,
        AudioMimeType::Mp4,
        AudioMimeType::Ogg,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AudioMimeType::WebmOpus => "audio/webm;codecs=opus",
            AudioMimeType::Webm => "audio/webm",
            AudioMimeType::Mp4 => "audio/mp4",
            AudioMimeType::Ogg => "audio/ogg",
            AudioMimeType::Wav => "audio/wav",
            AudioMimeType::Flac => "audio/flac",
            AudioMimeType::Mp3 => "audio/mp3",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            AudioMimeType::WebmOpus | AudioMimeType::Webm => "webm",
            AudioMimeType::Mp4 => "m4a",
            AudioMimeType::Ogg => "ogg",
            AudioMimeType::Wav => "wav",
            AudioMimeType::Flac => "flac",
            AudioMimeType::Mp3 => "mp3",
        }
    }

    /// Pick the first preferred format the platform supports, falling
    /// back to the platform default when none match.
    pub fn negotiate(supported: &[AudioMimeType], platform_default: AudioMimeType) -> AudioMimeType {
        Self::PREFERRED
            .iter()
            .copied()
            .find(|candidate| supported.contains(candidate))
            .unwrap_or(platform_default)
    }
}

impl fmt::Display for AudioMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AudioMimeType {
    type Err = UnsupportedMimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "audio/webm;codecs=opus" => Ok(AudioMimeType::WebmOpus),
            "audio/webm" => Ok(AudioMimeType::Webm),
            "audio/mp4" => Ok(AudioMimeType::Mp4),
            "audio/ogg" => Ok(AudioMimeType::Ogg),
            "audio/wav" | "audio/wave" | "audio/x-wav" => Ok(AudioMimeType::Wav),
            "audio/flac" | "audio/x-flac" => Ok(AudioMimeType::Flac),
            "audio/mp3" | "audio/mpeg" => Ok(AudioMimeType::Mp3),
            _ => Err(UnsupportedMimeError {
                input: s.to_string(),
            }),
        }
    }
}
