use serde::{Deserialize, Serialize};

use crate::error::ScreenCapError;

/// Recording states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecordingState {
    /// No recording in progress
    #[default]
    Idle,
    /// Worker is grabbing frames
    Recording,
    /// Worker is alive but not grabbing
    Paused,
    /// Worker stopped, output file being finalized
    Finalizing,
    /// Error state
    Error,
}

/// Error codes for recording failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    CaptureFailed,
    EncoderFailed,
    WorkerPanicked,
    IoError,
    Unknown,
}

impl ErrorCode {
    pub fn for_error(err: &ScreenCapError) -> Self {
        match err {
            ScreenCapError::Backend(_) => Self::CaptureFailed,
            ScreenCapError::Encoder(_) | ScreenCapError::Image(_) => Self::EncoderFailed,
            ScreenCapError::WorkerPanicked => Self::WorkerPanicked,
            ScreenCapError::Io(_) => Self::IoError,
            _ => Self::Unknown,
        }
    }
}

/// Error details
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingError {
    pub code: ErrorCode,
    pub message: String,
}

impl From<&ScreenCapError> for RecordingError {
    fn from(err: &ScreenCapError) -> Self {
        Self {
            code: ErrorCode::for_error(err),
            message: err.to_string(),
        }
    }
}

/// State transition error
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Invalid transition from {from:?} to {to:?}: {message}")]
pub struct TransitionError {
    pub from: RecordingState,
    pub to: RecordingState,
    pub message: String,
}

/// State machine guarding a single recording
#[derive(Debug)]
pub struct StateMachine {
    state: RecordingState,
    last_error: Option<RecordingError>,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: RecordingState::Idle,
            last_error: None,
        }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn last_error(&self) -> Option<&RecordingError> {
        self.last_error.as_ref()
    }

    /// Validate and perform state transition
    fn transition(&mut self, to: RecordingState) -> Result<RecordingState, TransitionError> {
        let from = self.state;

        let valid = match (from, to) {
            // From Idle
            (RecordingState::Idle, RecordingState::Recording) => true,
            (RecordingState::Idle, RecordingState::Error) => true,

            // From Recording
            (RecordingState::Recording, RecordingState::Paused) => true,
            (RecordingState::Recording, RecordingState::Finalizing) => true,
            (RecordingState::Recording, RecordingState::Error) => true,

            // From Paused
            (RecordingState::Paused, RecordingState::Recording) => true,
            (RecordingState::Paused, RecordingState::Finalizing) => true,
            (RecordingState::Paused, RecordingState::Error) => true,

            // From Finalizing
            (RecordingState::Finalizing, RecordingState::Idle) => true,
            (RecordingState::Finalizing, RecordingState::Error) => true,

            // From Error
            (RecordingState::Error, RecordingState::Idle) => true, // reset

            // Same state is always valid (no-op)
            (a, b) if a == b => true,

            _ => false,
        };

        if valid {
            self.state = to;
            if to != RecordingState::Error {
                self.last_error = None;
            }
            Ok(to)
        } else {
            Err(TransitionError {
                from,
                to,
                message: format!("Cannot transition from {:?} to {:?}", from, to),
            })
        }
    }

    /// Worker spawned (Idle → Recording)
    pub fn begin_recording(&mut self) -> Result<RecordingState, TransitionError> {
        if self.state != RecordingState::Idle {
            return Err(TransitionError {
                from: self.state,
                to: RecordingState::Recording,
                message: "Recording can only begin from idle".to_string(),
            });
        }
        self.transition(RecordingState::Recording)
    }

    /// Pause recording (Recording → Paused)
    pub fn pause(&mut self) -> Result<RecordingState, TransitionError> {
        if self.state != RecordingState::Recording {
            return Err(TransitionError {
                from: self.state,
                to: RecordingState::Paused,
                message: "Only an active recording can be paused".to_string(),
            });
        }
        self.transition(RecordingState::Paused)
    }

    /// Resume recording (Paused → Recording)
    pub fn resume(&mut self) -> Result<RecordingState, TransitionError> {
        if self.state != RecordingState::Paused {
            return Err(TransitionError {
                from: self.state,
                to: RecordingState::Recording,
                message: "Only a paused recording can be resumed".to_string(),
            });
        }
        self.transition(RecordingState::Recording)
    }

    /// Stop recording (Recording/Paused → Finalizing)
    pub fn stop(&mut self) -> Result<RecordingState, TransitionError> {
        self.transition(RecordingState::Finalizing)
    }

    /// Finalize complete (Finalizing → Idle)
    pub fn finalize_complete(&mut self) -> Result<RecordingState, TransitionError> {
        self.transition(RecordingState::Idle)
    }

    /// Set error state
    pub fn set_error(&mut self, error: RecordingError) -> RecordingState {
        self.last_error = Some(error);
        self.state = RecordingState::Error;
        RecordingState::Error
    }

    /// Reset from error (Error → Idle)
    pub fn reset(&mut self) -> Result<RecordingState, TransitionError> {
        self.transition(RecordingState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_idle() {
        let sm = StateMachine::new();
        assert_eq!(sm.state(), RecordingState::Idle);
    }

    #[test]
    fn test_valid_full_recording_flow() {
        let mut sm = StateMachine::new();

        assert!(sm.begin_recording().is_ok());
        assert_eq!(sm.state(), RecordingState::Recording);

        assert!(sm.pause().is_ok());
        assert_eq!(sm.state(), RecordingState::Paused);

        assert!(sm.resume().is_ok());
        assert_eq!(sm.state(), RecordingState::Recording);

        assert!(sm.stop().is_ok());
        assert_eq!(sm.state(), RecordingState::Finalizing);

        assert!(sm.finalize_complete().is_ok());
        assert_eq!(sm.state(), RecordingState::Idle);
    }

    #[test]
    fn test_invalid_transition_idle_to_paused() {
        let mut sm = StateMachine::new();
        let result = sm.pause();
        assert!(result.is_err());
        assert_eq!(sm.state(), RecordingState::Idle);
    }

    #[test]
    fn test_invalid_transition_idle_to_finalizing() {
        let mut sm = StateMachine::new();
        assert!(sm.stop().is_err());
    }

    #[test]
    fn test_double_pause_is_rejected() {
        let mut sm = StateMachine::new();
        sm.begin_recording().unwrap();
        sm.pause().unwrap();
        let err = sm.pause().unwrap_err();
        assert_eq!(err.from, RecordingState::Paused);
        assert_eq!(err.to, RecordingState::Paused);
    }

    #[test]
    fn test_resume_without_pause_is_rejected() {
        let mut sm = StateMachine::new();
        sm.begin_recording().unwrap();
        assert!(sm.resume().is_err());
        assert_eq!(sm.state(), RecordingState::Recording);
    }

    #[test]
    fn test_error_state_and_reset() {
        let mut sm = StateMachine::new();
        sm.begin_recording().unwrap();

        sm.set_error(RecordingError {
            code: ErrorCode::CaptureFailed,
            message: "Monitor went away".to_string(),
        });

        assert_eq!(sm.state(), RecordingState::Error);
        assert_eq!(sm.last_error().unwrap().code, ErrorCode::CaptureFailed);

        assert!(sm.reset().is_ok());
        assert_eq!(sm.state(), RecordingState::Idle);
        assert!(sm.last_error().is_none());
    }

    #[test]
    fn test_stop_from_paused() {
        let mut sm = StateMachine::new();
        sm.begin_recording().unwrap();
        sm.pause().unwrap();

        assert!(sm.stop().is_ok());
        assert_eq!(sm.state(), RecordingState::Finalizing);
    }

    #[test]
    fn test_same_state_transition_is_noop() {
        let mut sm = StateMachine::new();
        sm.begin_recording().unwrap();

        let result = sm.transition(RecordingState::Recording);
        assert!(result.is_ok());
        assert_eq!(sm.state(), RecordingState::Recording);
    }

    #[test]
    fn test_error_code_mapping() {
        assert_eq!(
            ErrorCode::for_error(&ScreenCapError::WorkerPanicked),
            ErrorCode::WorkerPanicked
        );
        assert_eq!(
            ErrorCode::for_error(&ScreenCapError::NoActiveRecording),
            ErrorCode::Unknown
        );
    }
}
