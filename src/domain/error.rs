//! Domain error types

use thiserror::Error;

/// Error when a classification label string is not one of the known labels
#[derive(Debug, Clone, Error)]
#[error("Invalid label: \"{input}\". Valid labels are: Hate Speech, Offensive Language, Normal Speech")]
pub struct InvalidLabelError {
    pub input: String,
}

/// Error when a classification request carries neither text nor audio
#[derive(Debug, Clone, Error)]
#[error("Nothing to classify. Provide text, audio, or both.")]
pub struct EmptyRequestError;

/// Error when a MIME type string is not a supported audio format
#[derive(Debug, Clone, Error)]
#[error("Unsupported audio MIME type: \"{input}\"")]
pub struct UnsupportedMimeError {
    pub input: String,
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}

/// Broad failure category, used to pick presentation and exit behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Microphone or OS-level access was refused
    Permission,
    /// The input itself is unusable (empty, too short, malformed)
    Validation,
    /// The local capture device or encoder failed mid-session
    Device,
    /// The network or the remote service failed
    Transport,
    /// The model answered, but not with something usable
    Model,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Permission => "permission",
            ErrorKind::Validation => "validation",
            ErrorKind::Device => "device",
            ErrorKind::Transport => "transport",
            ErrorKind::Model => "model",
        }
    }
}
