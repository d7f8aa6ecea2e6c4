//! Capture domain: the microphone session lifecycle

mod session;

pub use session::{CaptureSession, CaptureState, InvalidStateTransition, PermissionKind};
