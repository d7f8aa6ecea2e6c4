//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod audio;
pub mod capture;
pub mod classification;
pub mod config;
pub mod error;

// Re-export common types
pub use audio::{AudioMimeType, AudioPayload};
pub use capture::{CaptureSession, CaptureState, PermissionKind};
pub use classification::{ClassificationRequest, Label, ModelInstruction, Verdict};
pub use config::AppConfig;
pub use error::*;
