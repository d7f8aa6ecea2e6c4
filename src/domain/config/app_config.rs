//! Application configuration

use serde::{Deserialize, Serialize};

/// Default Gemini model used by the gateway
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default gateway URL the client talks to
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8787";

/// Default port the gateway listens on
pub const DEFAULT_PORT: u16 = 8787;

/// Default directory of static demo assets served by the gateway
pub const DEFAULT_STATIC_DIR: &str = "dist";

/// Default CORS origin policy ("*" allows any origin)
pub const DEFAULT_CORS_ORIGIN: &str = "*";

/// Default minimum capture length accepted for analysis
pub const DEFAULT_MIN_CAPTURE_MS: u64 = 500;

/// Application configuration.
/// All fields are optional so layers (file, environment, CLI flags)
/// can be merged before falling back to defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Gemini API key (server side only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Gemini model name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Gateway URL the client sends requests to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub server_url: Option<String>,

    /// Port the gateway binds to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Directory of static demo assets
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<String>,

    /// Allowed CORS origin, or "*" for any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cors_allow_origin: Option<String>,

    /// Whether to show a provisional transcript while recording
    #[serde(skip_serializing_if = "Option::is_none")]
    pub live_transcript: Option<bool>,

    /// Minimum capture length in milliseconds accepted for analysis
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_capture_ms: Option<u64>,
}

impl AppConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// A config populated with the documented defaults, used to seed a
    /// fresh config file. The API key stays unset.
    pub fn defaults() -> Self {
        Self {
            api_key: None,
            model: Some(DEFAULT_MODEL.to_string()),
            server_url: Some(DEFAULT_SERVER_URL.to_string()),
            port: Some(DEFAULT_PORT),
            static_dir: Some(DEFAULT_STATIC_DIR.to_string()),
            cors_allow_origin: Some(DEFAULT_CORS_ORIGIN.to_string()),
            live_transcript: Some(true),
            min_capture_ms: Some(DEFAULT_MIN_CAPTURE_MS),
        }
    }

    /// Merge with another config. Values in `other` take precedence.
    pub fn merge(self, other: AppConfig) -> AppConfig {
        AppConfig {
            api_key: other.api_key.or(self.api_key),
            model: other.model.or(self.model),
            server_url: other.server_url.or(self.server_url),
            port: other.port.or(self.port),
            static_dir: other.static_dir.or(self.static_dir),
            cors_allow_origin: other.cors_allow_origin.or(self.cors_allow_origin),
            live_transcript: other.live_transcript.or(self.live_transcript),
            min_capture_ms: other.min_capture_ms.or(self.min_capture_ms),
        }
    }

    pub fn model_or_default(&self) -> &str {
        self.model.as_deref().unwrap_or(DEFAULT_MODEL)
    }

    pub fn server_url_or_default(&self) -> &str {
        self.server_url.as_deref().unwrap_or(DEFAULT_SERVER_URL)
    }

    pub fn port_or_default(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_PORT)
    }

    pub fn static_dir_or_default(&self) -> &str {
        self.static_dir.as_deref().unwrap_or(DEFAULT_STATIC_DIR)
    }

    pub fn cors_allow_origin_or_default(&self) -> &str {
        self.cors_allow_origin.as_deref().unwrap_or(DEFAULT_CORS_ORIGIN)
    }

    pub fn live_transcript_or_default(&self) -> bool {
        self.live_transcript.unwrap_or(true)
    }

    pub fn min_capture_ms_or_default(&self) -> u64 {
        self.min_capture_ms.unwrap_or(DEFAULT_MIN_CAPTURE_MS)
    }
}
