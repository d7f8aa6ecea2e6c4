//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod backend;
pub mod capture;
pub mod config;
pub mod transcriber;

// Re-export common types
pub use backend::{BackendError, ClassificationBackend, FileAnalysis, FileAnalyzer};
pub use capture::{CaptureDevice, CaptureError};
pub use config::ConfigStore;
pub use transcriber::{ProvisionalTranscriber, TranscriberError};
