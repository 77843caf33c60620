//! Recording session state machine

use std::fmt;
use thiserror::Error;

/// Recording session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordingStatus {
    #[default]
    Idle,
    Recording,
    Paused,
    Stopped,
}

impl RecordingStatus {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Paused => "paused",
            Self::Stopped => "stopped",
        }
    }
}

impl fmt::Display for RecordingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid session transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Cannot {action} while the session is {current_status}")]
pub struct InvalidStateTransition {
    pub current_status: RecordingStatus,
    pub action: String,
}

/// Recording session entity.
/// Tracks the capture lifecycle and the elapsed-time counter.
///
/// State machine:
///   IDLE/STOPPED -> RECORDING (start)
///   RECORDING -> PAUSED (pause)
///   PAUSED -> RECORDING (resume)
///   RECORDING/PAUSED -> STOPPED (stop)
///
/// The elapsed counter advances one second per `tick` and only while
/// the session is recording; pausing freezes it, starting resets it.
#[derive(Debug, Default)]
pub struct RecordingSession {
    status: RecordingStatus,
    elapsed_seconds: u64,
}

impl RecordingSession {
    /// Create a new session in idle state
    pub fn new() -> Self {
        Self {
            status: RecordingStatus::Idle,
            elapsed_seconds: 0,
        }
    }

    /// Get the current status
    pub fn status(&self) -> RecordingStatus {
        self.status
    }

    /// Get the elapsed recording time in whole seconds
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Check if currently idle
    pub fn is_idle(&self) -> bool {
        self.status == RecordingStatus::Idle
    }

    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        self.status == RecordingStatus::Recording
    }

    /// Check if currently paused
    pub fn is_paused(&self) -> bool {
        self.status == RecordingStatus::Paused
    }

    /// Check if stopped
    pub fn is_stopped(&self) -> bool {
        self.status == RecordingStatus::Stopped
    }

    /// Whether a new recording may begin from the current status
    pub fn can_start(&self) -> bool {
        matches!(
            self.status,
            RecordingStatus::Idle | RecordingStatus::Stopped
        )
    }

    /// Transition from IDLE or STOPPED to RECORDING.
    /// Resets the elapsed counter for the new take.
    pub fn start(&mut self) -> Result<(), InvalidStateTransition> {
        if !self.can_start() {
            return Err(InvalidStateTransition {
                current_status: self.status,
                action: "start recording".to_string(),
            });
        }
        self.status = RecordingStatus::Recording;
        self.elapsed_seconds = 0;
        Ok(())
    }

    /// Transition from RECORDING to PAUSED
    pub fn pause(&mut self) -> Result<(), InvalidStateTransition> {
        if self.status != RecordingStatus::Recording {
            return Err(InvalidStateTransition {
                current_status: self.status,
                action: "pause recording".to_string(),
            });
        }
        self.status = RecordingStatus::Paused;
        Ok(())
    }

    /// Transition from PAUSED back to RECORDING
    pub fn resume(&mut self) -> Result<(), InvalidStateTransition> {
        if self.status != RecordingStatus::Paused {
            return Err(InvalidStateTransition {
                current_status: self.status,
                action: "resume recording".to_string(),
            });
        }
        self.status = RecordingStatus::Recording;
        Ok(())
    }

    /// Transition from RECORDING or PAUSED to STOPPED
    pub fn stop(&mut self) -> Result<(), InvalidStateTransition> {
        if self.status != RecordingStatus::Recording && self.status != RecordingStatus::Paused {
            return Err(InvalidStateTransition {
                current_status: self.status,
                action: "stop recording".to_string(),
            });
        }
        self.status = RecordingStatus::Stopped;
        Ok(())
    }

    /// Advance the elapsed counter by one second.
    /// Counts only while recording; a no-op in any other status.
    pub fn tick(&mut self) -> u64 {
        if self.status == RecordingStatus::Recording {
            self.elapsed_seconds += 1;
        }
        self.elapsed_seconds
    }
}
