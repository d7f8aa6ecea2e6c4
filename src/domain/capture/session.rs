//! Capture session state machine

use std::fmt;
use thiserror::Error;

/// Why microphone access failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionKind {
    Denied,
    DeviceNotFound,
    DeviceBusy,
    Unknown,
}

impl PermissionKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Denied => "denied",
            Self::DeviceNotFound => "device-not-found",
            Self::DeviceBusy => "device-busy",
            Self::Unknown => "unknown",
        }
    }

    /// Actionable hint shown alongside the failure
    pub const fn hint(&self) -> &'static str {
        match self {
            Self::Denied => "Grant microphone access in your system settings, then try again",
            Self::DeviceNotFound => "Connect a microphone or select an input device, then try again",
            Self::DeviceBusy => "Close the application holding the microphone, then try again",
            Self::Unknown => "Check your audio input configuration, then try again",
        }
    }
}

impl fmt::Display for PermissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Capture states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CaptureState {
    #[default]
    Idle,
    PermissionError(PermissionKind),
    Recording,
    Analyzing,
    Stopped,
}

impl CaptureState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::PermissionError(_) => "permission-error",
            Self::Recording => "recording",
            Self::Analyzing => "analyzing",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: CaptureState,
    pub action: String,
}

/// Capture session entity.
/// Manages state transitions for one microphone capture lifecycle.
///
/// State machine:
///   IDLE -> RECORDING (start_recording)
///   IDLE -> PERMISSION_ERROR (fail_permission)
///   PERMISSION_ERROR -> RECORDING (start_recording, after access is granted)
///   PERMISSION_ERROR -> PERMISSION_ERROR (fail_permission, retry still refused)
///   RECORDING -> ANALYZING (stop_recording)
///   RECORDING -> IDLE (cancel_recording)
///   ANALYZING -> STOPPED (complete_capture)
///   ANALYZING -> IDLE (abort_capture)
///   STOPPED -> IDLE (discard)
#[derive(Debug, Default)]
pub struct CaptureSession {
    state: CaptureState,
}

impl CaptureSession {
    /// Create a new capture session in idle state
    pub fn new() -> Self {
        Self {
            state: CaptureState::Idle,
        }
    }

    /// Get the current state
    pub fn state(&self) -> CaptureState {
        self.state
    }

    /// Check if currently idle
    pub fn is_idle(&self) -> bool {
        self.state == CaptureState::Idle
    }

    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        self.state == CaptureState::Recording
    }

    /// Check whether a recording may start from the current state.
    ///
    /// Callers use this to validate before opening the audio device,
    /// so a device handle is only ever held in the recording state.
    pub fn can_start(&self) -> bool {
        matches!(
            self.state,
            CaptureState::Idle | CaptureState::PermissionError(_)
        )
    }

    /// Transition to RECORDING from IDLE or PERMISSION_ERROR
    pub fn start_recording(&mut self) -> Result<(), InvalidStateTransition> {
        if !self.can_start() {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "start recording".to_string(),
            });
        }
        self.state = CaptureState::Recording;
        Ok(())
    }

    /// Record a microphone access failure.
    /// Allowed from IDLE and from PERMISSION_ERROR (a retry that was
    /// refused again, possibly for a different reason).
    pub fn fail_permission(&mut self, kind: PermissionKind) -> Result<(), InvalidStateTransition> {
        if !self.can_start() {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "record permission failure".to_string(),
            });
        }
        self.state = CaptureState::PermissionError(kind);
        Ok(())
    }

    /// Transition from RECORDING to ANALYZING
    pub fn stop_recording(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != CaptureState::Recording {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "stop recording".to_string(),
            });
        }
        self.state = CaptureState::Analyzing;
        Ok(())
    }

    /// Transition from RECORDING to IDLE (discard without analysis)
    pub fn cancel_recording(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != CaptureState::Recording {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "cancel recording".to_string(),
            });
        }
        self.state = CaptureState::Idle;
        Ok(())
    }

    /// Transition from ANALYZING to STOPPED
    pub fn complete_capture(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != CaptureState::Analyzing {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "complete capture".to_string(),
            });
        }
        self.state = CaptureState::Stopped;
        Ok(())
    }

    /// Transition from ANALYZING to IDLE (finalization failed)
    pub fn abort_capture(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != CaptureState::Analyzing {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "abort capture".to_string(),
            });
        }
        self.state = CaptureState::Idle;
        Ok(())
    }

    /// Transition from STOPPED to IDLE
    pub fn discard(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state != CaptureState::Stopped {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "discard capture".to_string(),
            });
        }
        self.state = CaptureState::Idle;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_is_idle() {
        let session = CaptureSession::new();
        assert!(session.is_idle());
        assert!(!session.is_recording());
        assert!(session.can_start());
    }

    #[test]
    fn start_recording_from_idle() {
        let mut session = CaptureSession::new();
        assert!(session.start_recording().is_ok());
        assert!(session.is_recording());
    }

    #[test]
    fn start_recording_from_recording_fails() {
        let mut session = CaptureSession::new();
        session.start_recording().unwrap();

        let err = session.start_recording().unwrap_err();
        assert_eq!(err.current_state, CaptureState::Recording);
        assert!(err.action.contains("start recording"));
    }

    #[test]
    fn start_recording_from_analyzing_fails() {
        let mut session = CaptureSession::new();
        session.start_recording().unwrap();
        session.stop_recording().unwrap();

        let err = session.start_recording().unwrap_err();
        assert_eq!(err.current_state, CaptureState::Analyzing);
    }

    #[test]
    fn start_recording_from_stopped_fails() {
        let mut session = CaptureSession::new();
        session.start_recording().unwrap();
        session.stop_recording().unwrap();
        session.complete_capture().unwrap();

        let err = session.start_recording().unwrap_err();
        assert_eq!(err.current_state, CaptureState::Stopped);
    }

    #[test]
    fn fail_permission_from_idle() {
        let mut session = CaptureSession::new();
        assert!(session.fail_permission(PermissionKind::Denied).is_ok());
        assert_eq!(
            session.state(),
            CaptureState::PermissionError(PermissionKind::Denied)
        );
    }

    #[test]
    fn retry_after_permission_granted() {
        let mut session = CaptureSession::new();
        session.fail_permission(PermissionKind::Denied).unwrap();

        assert!(session.start_recording().is_ok());
        assert!(session.is_recording());
    }

    #[test]
    fn refused_retry_updates_permission_kind() {
        let mut session = CaptureSession::new();
        session.fail_permission(PermissionKind::Denied).unwrap();
        session.fail_permission(PermissionKind::DeviceBusy).unwrap();

        assert_eq!(
            session.state(),
            CaptureState::PermissionError(PermissionKind::DeviceBusy)
        );
    }

    #[test]
    fn fail_permission_while_recording_fails() {
        let mut session = CaptureSession::new();
        session.start_recording().unwrap();

        let err = session.fail_permission(PermissionKind::Unknown).unwrap_err();
        assert_eq!(err.current_state, CaptureState::Recording);
    }

    #[test]
    fn stop_recording_from_recording() {
        let mut session = CaptureSession::new();
        session.start_recording().unwrap();

        assert!(session.stop_recording().is_ok());
        assert_eq!(session.state(), CaptureState::Analyzing);
    }

    #[test]
    fn stop_recording_from_idle_fails() {
        let mut session = CaptureSession::new();

        let err = session.stop_recording().unwrap_err();
        assert_eq!(err.current_state, CaptureState::Idle);
    }

    #[test]
    fn cancel_recording_from_recording() {
        let mut session = CaptureSession::new();
        session.start_recording().unwrap();

        assert!(session.cancel_recording().is_ok());
        assert!(session.is_idle());
    }

    #[test]
    fn cancel_recording_from_idle_fails() {
        let mut session = CaptureSession::new();

        let err = session.cancel_recording().unwrap_err();
        assert_eq!(err.current_state, CaptureState::Idle);
    }

    #[test]
    fn complete_capture_from_analyzing() {
        let mut session = CaptureSession::new();
        session.start_recording().unwrap();
        session.stop_recording().unwrap();

        assert!(session.complete_capture().is_ok());
        assert_eq!(session.state(), CaptureState::Stopped);
    }

    #[test]
    fn complete_capture_from_recording_fails() {
        let mut session = CaptureSession::new();
        session.start_recording().unwrap();

        let err = session.complete_capture().unwrap_err();
        assert_eq!(err.current_state, CaptureState::Recording);
    }

    #[test]
    fn abort_capture_from_analyzing() {
        let mut session = CaptureSession::new();
        session.start_recording().unwrap();
        session.stop_recording().unwrap();

        assert!(session.abort_capture().is_ok());
        assert!(session.is_idle());
    }

    #[test]
    fn discard_from_stopped() {
        let mut session = CaptureSession::new();
        session.start_recording().unwrap();
        session.stop_recording().unwrap();
        session.complete_capture().unwrap();

        assert!(session.discard().is_ok());
        assert!(session.is_idle());
    }

    #[test]
    fn discard_from_idle_fails() {
        let mut session = CaptureSession::new();

        let err = session.discard().unwrap_err();
        assert_eq!(err.current_state, CaptureState::Idle);
    }

    #[test]
    fn full_cycle() {
        let mut session = CaptureSession::new();
        assert!(session.is_idle());

        session.start_recording().unwrap();
        assert!(session.is_recording());

        session.stop_recording().unwrap();
        assert_eq!(session.state(), CaptureState::Analyzing);

        session.complete_capture().unwrap();
        assert_eq!(session.state(), CaptureState::Stopped);

        session.discard().unwrap();
        assert!(session.is_idle());

        // Can start another cycle
        session.start_recording().unwrap();
        assert!(session.is_recording());
    }

    #[test]
    fn state_display() {
        assert_eq!(CaptureState::Idle.to_string(), "idle");
        assert_eq!(
            CaptureState::PermissionError(PermissionKind::Denied).to_string(),
            "permission-error"
        );
        assert_eq!(CaptureState::Recording.to_string(), "recording");
        assert_eq!(CaptureState::Analyzing.to_string(), "analyzing");
        assert_eq!(CaptureState::Stopped.to_string(), "stopped");
    }

    #[test]
    fn error_display() {
        let err = InvalidStateTransition {
            current_state: CaptureState::Stopped,
            action: "start recording".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("start recording"));
        assert!(msg.contains("stopped"));
    }

    #[test]
    fn permission_hints_are_actionable() {
        for kind in [
            PermissionKind::Denied,
            PermissionKind::DeviceNotFound,
            PermissionKind::DeviceBusy,
            PermissionKind::Unknown,
        ] {
            assert!(kind.hint().contains("try again"));
        }
    }
}
