//! Transcription service port interface

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::note::NoteId;
use crate::domain::transcription::{AudioArtifact, JobId, Specialty};

/// Transcription service errors
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    #[error("Invalid or missing API token")]
    Unauthorized,

    #[error("API request failed: {0}")]
    RequestFailed(String),

    #[error("API error: {0}")]
    ApiError(String),

    #[error("Failed to parse API response: {0}")]
    ParseError(String),
}

/// Status of a transcription job as reported by the service
#[derive(Debug, Clone, PartialEq)]
pub enum JobReport {
    /// The service is still working on the job
    InProgress,
    /// The job finished and produced a transcript
    Completed { transcript: String },
    /// The job failed on the service side
    Failed { reason: Option<String> },
}

/// Port for the remote transcription service
#[async_trait]
pub trait TranscriptionService: Send + Sync {
    /// Open a live transcription job for a recording in progress.
    ///
    /// # Returns
    /// The job id assigned by the service
    async fn start_job(&self, specialty: Specialty) -> Result<JobId, ServiceError>;

    /// Upload a finished audio file for transcription.
    ///
    /// # Returns
    /// The job id assigned by the service
    async fn upload_audio(
        &self,
        audio: &AudioArtifact,
        specialty: Specialty,
    ) -> Result<JobId, ServiceError>;

    /// Fetch the current status of a job.
    async fn job_status(&self, job_id: &JobId) -> Result<JobReport, ServiceError>;

    /// Generate a clinical note from a completed transcription.
    ///
    /// # Returns
    /// The id of the generated note
    async fn generate_note(
        &self,
        job_id: &JobId,
        specialty: Specialty,
    ) -> Result<NoteId, ServiceError>;
}
