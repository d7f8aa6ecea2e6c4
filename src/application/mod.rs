//! Application layer - Use cases and port interfaces
//!
//! Contains the core business operations and trait definitions
//! for external system interactions.

pub mod bridge;
pub mod capture;
pub mod dispatch;
pub mod ports;

// Re-export use cases
pub use bridge::TranscriptionBridge;
pub use capture::{
    CaptureConfig, CaptureOutput, CaptureUseCase, CaptureUseCaseError,
};
pub use dispatch::{DispatchError, DispatchInput, DispatchUseCase};
