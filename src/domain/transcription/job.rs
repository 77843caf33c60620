//! Transcription job state machine

use std::fmt;
use thiserror::Error;

use crate::domain::transcription::Specialty;

/// Opaque identifier assigned to a job by the remote service
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    /// Wrap a server-assigned identifier
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the identifier string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transcription job states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JobStatus {
    #[default]
    Unstarted,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unstarted => "unstarted",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether the job has reached a final state
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid job transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Cannot {action} while the transcription job is {current_status}")]
pub struct InvalidJobTransition {
    pub current_status: JobStatus,
    pub action: String,
}

/// Transcription job entity.
/// Owns the lifecycle of one remote job.
///
/// State machine:
///   UNSTARTED -> PROCESSING (begin, records the server-assigned id)
///   PROCESSING -> COMPLETED (complete, stores the transcript)
///   PROCESSING -> FAILED (fail)
///
/// COMPLETED and FAILED are absorbing: late poll results arriving after
/// a terminal transition are ignored, which `complete`/`fail` signal by
/// returning `false`.
#[derive(Debug, Default)]
pub struct TranscriptionJob {
    job_id: Option<JobId>,
    status: JobStatus,
    transcript: Option<String>,
    failure_reason: Option<String>,
    specialty: Option<Specialty>,
}

impl TranscriptionJob {
    /// Create a new, unstarted job
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current status
    pub fn status(&self) -> JobStatus {
        self.status
    }

    /// Get the server-assigned id, if the job has begun
    pub fn job_id(&self) -> Option<&JobId> {
        self.job_id.as_ref()
    }

    /// Get the transcript, present only once completed
    pub fn transcript(&self) -> Option<&str> {
        self.transcript.as_deref()
    }

    /// Get the failure reason, if the job failed with one
    pub fn failure_reason(&self) -> Option<&str> {
        self.failure_reason.as_deref()
    }

    /// Get the specialty the job was created with
    pub fn specialty(&self) -> Option<Specialty> {
        self.specialty
    }

    /// Whether the job has reached a final state
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Transition from UNSTARTED to PROCESSING.
    /// Records the server-assigned id and the specialty; both are
    /// written exactly once.
    pub fn begin(&mut self, job_id: JobId, specialty: Specialty) -> Result<(), InvalidJobTransition> {
        if self.status != JobStatus::Unstarted {
            return Err(InvalidJobTransition {
                current_status: self.status,
                action: "begin a job".to_string(),
            });
        }
        self.job_id = Some(job_id);
        self.specialty = Some(specialty);
        self.status = JobStatus::Processing;
        Ok(())
    }

    /// Transition from PROCESSING to COMPLETED, storing the transcript.
    /// Returns `false` without changing anything from any other state.
    pub fn complete(&mut self, transcript: String) -> bool {
        if self.status != JobStatus::Processing {
            return false;
        }
        self.transcript = Some(transcript);
        self.status = JobStatus::Completed;
        true
    }

    /// Transition from PROCESSING to FAILED.
    /// Returns `false` without changing anything from any other state.
    pub fn fail(&mut self, reason: Option<String>) -> bool {
        if self.status != JobStatus::Processing {
            return false;
        }
        self.failure_reason = reason;
        self.status = JobStatus::Failed;
        true
    }
}
