//! Transcription job tracking use case
//!
//! Owns the lifecycle of one remote transcription job: starting it,
//! polling the service for its status, and recording the outcome.
//! Polling runs on a background task; `check_now` lets callers force
//! an immediate status check (used when a recording stops).

use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::transcription::{
    AudioArtifact, AudioMimeType, JobId, JobStatus, Specialty, TranscriptionJob, MAX_UPLOAD_BYTES,
};

use super::ports::{JobReport, ServiceError, TranscriptionService};

/// How long the poll loop waits between status checks
pub const POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Errors from starting a transcription job
#[derive(Debug, Error)]
pub enum JobStartError {
    #[error("A transcription job has already been started")]
    AlreadyStarted,

    #[error("Audio file too large: {size} bytes (limit: {limit} bytes)")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("Unsupported audio type: {content_type}")]
    UnsupportedMedia { content_type: String },

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Point-in-time view of the tracked job
#[derive(Debug, Clone)]
pub struct JobSnapshot {
    pub job_id: Option<JobId>,
    pub status: JobStatus,
    pub transcript: Option<String>,
    pub failure_reason: Option<String>,
    pub specialty: Option<Specialty>,
}

/// Tracks one transcription job against the remote service.
///
/// The job entity is shared with the background poll task. A separate
/// check gate serializes `check_now` against the poll loop so the
/// service never sees two concurrent status queries for the same job.
pub struct TranscriptionJobClient<S: TranscriptionService> {
    service: Arc<S>,
    job: Arc<Mutex<TranscriptionJob>>,
    check_gate: Arc<Mutex<()>>,
    poll_task: StdMutex<Option<JoinHandle<()>>>,
    poll_interval: Duration,
}

impl<S: TranscriptionService> TranscriptionJobClient<S> {
    /// Create a client that polls at the standard interval
    pub fn new(service: Arc<S>) -> Self {
        Self::with_poll_interval(service, POLL_INTERVAL)
    }

    /// Create a client with a custom poll interval
    pub fn with_poll_interval(service: Arc<S>, poll_interval: Duration) -> Self {
        Self {
            service,
            job: Arc::new(Mutex::new(TranscriptionJob::new())),
            check_gate: Arc::new(Mutex::new(())),
            poll_task: StdMutex::new(None),
            poll_interval,
        }
    }

    /// Get a snapshot of the tracked job
    pub async fn snapshot(&self) -> JobSnapshot {
        let job = self.job.lock().await;
        JobSnapshot {
            job_id: job.job_id().cloned(),
            status: job.status(),
            transcript: job.transcript().map(str::to_string),
            failure_reason: job.failure_reason().map(str::to_string),
            specialty: job.specialty(),
        }
    }

    /// Get the current job status
    pub async fn status(&self) -> JobStatus {
        self.job.lock().await.status()
    }

    /// Check if the job has reached a terminal status
    pub async fn is_terminal(&self) -> bool {
        self.job.lock().await.is_terminal()
    }

    /// Check if the background poll task is running
    pub fn is_polling(&self) -> bool {
        self.poll_task
            .lock()
            .map(|slot| slot.as_ref().is_some_and(|task| !task.is_finished()))
            .unwrap_or(false)
    }

    /// Force an immediate status check, then stop polling if the job
    /// resolved. Returns the status after the check.
    pub async fn check_now(&self) -> JobStatus {
        let keep_polling = Self::poll_once(self.service.as_ref(), &self.job, &self.check_gate).await;
        if !keep_polling {
            self.disarm();
        }
        self.status().await
    }

    /// Query the service once and fold the report into the job.
    /// Returns whether polling should continue.
    async fn poll_once(service: &S, job: &Mutex<TranscriptionJob>, gate: &Mutex<()>) -> bool {
        let _pass = gate.lock().await;

        let job_id = {
            let job = job.lock().await;
            if job.status() != JobStatus::Processing {
                return false;
            }
            match job.job_id() {
                Some(id) => id.clone(),
                None => return false,
            }
        };

        match service.job_status(&job_id).await {
            Ok(JobReport::InProgress) => {
                debug!(job_id = %job_id, "transcription still in progress");
                true
            }
            Ok(JobReport::Completed { transcript }) => {
                let mut job = job.lock().await;
                if !job.complete(transcript) {
                    debug!(job_id = %job_id, "completion arrived after job resolved; ignored");
                }
                false
            }
            Ok(JobReport::Failed { reason }) => {
                warn!(job_id = %job_id, "transcription failed on the service side");
                job.lock().await.fail(reason);
                false
            }
            Err(err) => {
                warn!(job_id = %job_id, error = %err, "status check failed; marking job failed");
                job.lock().await.fail(Some(err.to_string()));
                false
            }
        }
    }

    /// Abort the background poll task if one is running
    fn disarm(&self) {
        if let Ok(mut slot) = self.poll_task.lock() {
            if let Some(task) = slot.take() {
                task.abort();
            }
        }
    }
}

impl<S: TranscriptionService + 'static> TranscriptionJobClient<S> {
    /// Open a live transcription job and begin polling.
    ///
    /// The job lock is held across the service call so concurrent
    /// starts resolve to exactly one remote job.
    pub async fn start(&self, specialty: Specialty) -> Result<JobId, JobStartError> {
        let mut job = self.job.lock().await;
        if job.status() != JobStatus::Unstarted {
            return Err(JobStartError::AlreadyStarted);
        }

        let job_id = self.service.start_job(specialty).await?;
        job.begin(job_id.clone(), specialty)
            .map_err(|_| JobStartError::AlreadyStarted)?;
        drop(job);

        debug!(job_id = %job_id, "transcription job started");
        self.arm_poll();
        Ok(job_id)
    }

    /// Upload a finished audio file as a new transcription job and
    /// begin polling. The size limit is checked before the media type
    /// so an oversized file always reports as too large.
    pub async fn upload(
        &self,
        data: Vec<u8>,
        content_type: &str,
        specialty: Specialty,
    ) -> Result<JobId, JobStartError> {
        if data.len() > MAX_UPLOAD_BYTES {
            return Err(JobStartError::PayloadTooLarge {
                size: data.len(),
                limit: MAX_UPLOAD_BYTES,
            });
        }

        let mime_type = AudioMimeType::from_content_type(content_type).ok_or_else(|| {
            JobStartError::UnsupportedMedia {
                content_type: content_type.to_string(),
            }
        })?;
        let artifact = AudioArtifact::new(data, mime_type);

        let mut job = self.job.lock().await;
        if job.status() != JobStatus::Unstarted {
            return Err(JobStartError::AlreadyStarted);
        }

        let job_id = self.service.upload_audio(&artifact, specialty).await?;
        job.begin(job_id.clone(), specialty)
            .map_err(|_| JobStartError::AlreadyStarted)?;
        drop(job);

        debug!(job_id = %job_id, "audio uploaded for transcription");
        self.arm_poll();
        Ok(job_id)
    }

    /// Spawn the background poll loop, replacing any previous one.
    /// The first check happens one full interval after starting.
    fn arm_poll(&self) {
        let service = Arc::clone(&self.service);
        let job = Arc::clone(&self.job);
        let gate = Arc::clone(&self.check_gate);
        let interval = self.poll_interval;

        let task = tokio::spawn(async move {
            loop {
                tokio::time::sleep(interval).await;
                if !Self::poll_once(service.as_ref(), &job, &gate).await {
                    break;
                }
            }
        });

        if let Ok(mut slot) = self.poll_task.lock() {
            if let Some(old) = slot.replace(task) {
                old.abort();
            }
        }
    }
}

impl<S: TranscriptionService> Drop for TranscriptionJobClient<S> {
    fn drop(&mut self) {
        self.disarm();
    }
}
