//! Encoded audio value object

use base64::{engine::general_purpose, Engine as _};

use super::mime::AudioMimeType;

/// A finished, encoded audio capture ready to ship to a backend
#[derive(Debug, Clone)]
pub struct AudioPayload {
    data: Vec<u8>,
    mime_type: AudioMimeType,
    duration_ms: u64,
}

impl AudioPayload {
    pub fn new(data: Vec<u8>, mime_type: AudioMimeType, duration_ms: u64) -> Self {
        Self {
            data,
            mime_type,
            duration_ms,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn mime_type(&self) -> AudioMimeType {
        self.mime_type
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn to_base64(&self) -> String {
        general_purpose::STANDARD.encode(&self.data)
    }

    /// Human-readable size like "12.3 KB"
    pub fn human_readable_size(&self) -> String {
        let bytes = self.data.len() as f64;
        if bytes < 1024.0 {
            format!("{} B", self.data.len())
        } else if bytes < 1024.0 * 1024.0 {
            format!("{:.1} KB", bytes / 1024.0)
        } else {
            format!("{:.1} MB", bytes / (1024.0 * 1024.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_accessors() {
        let payload = AudioPayload::new(vec![10, 20, 30], AudioMimeType::Flac, 2500);
        assert_eq!(payload.data(), &[10, 20, 30]);
        assert_eq!(payload.mime_type(), AudioMimeType::Flac);
        assert_eq!(payload.duration_ms(), 2500);
        assert!(!payload.is_empty());
    }

    #[test]
    fn test_to_base64() {
        let payload = AudioPayload::new(b"hello".to_vec(), AudioMimeType::Wav, 100);
        assert_eq!(payload.to_base64(), "aGVsbG8=");
    }

    #[test]
    fn test_empty_payload() {
        let payload = AudioPayload::new(vec![], AudioMimeType::Wav, 0);
        assert!(payload.is_empty());
        assert_eq!(payload.to_base64(), "");
    }

    #[test]
    fn test_human_readable_size() {
        assert_eq!(
            AudioPayload::new(vec![0; 512], AudioMimeType::Wav, 0).human_readable_size(),
            "512 B"
        );
        assert_eq!(
            AudioPayload::new(vec![0; 2048], AudioMimeType::Wav, 0).human_readable_size(),
            "2.0 KB"
        );
        assert_eq!(
            AudioPayload::new(vec![0; 3 * 1024 * 1024], AudioMimeType::Wav, 0)
                .human_readable_size(),
            "3.0 MB"
        );
    }
}
