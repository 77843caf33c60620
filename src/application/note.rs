//! Note generation use case

use std::sync::Arc;

use thiserror::Error;

use crate::domain::note::NoteId;
use crate::domain::transcription::JobStatus;

use super::job::TranscriptionJobClient;
use super::ports::{ServiceError, TranscriptionService};

/// Errors from note generation
#[derive(Debug, Error)]
pub enum NoteGenerationError {
    #[error("No transcription job has been started")]
    JobNotStarted,

    #[error("Transcription is not complete (status: {status})")]
    JobNotCompleted { status: JobStatus },

    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// Turns a completed transcription into a clinical note
pub struct NoteGenerator<S: TranscriptionService> {
    service: Arc<S>,
}

impl<S: TranscriptionService> NoteGenerator<S> {
    pub fn new(service: Arc<S>) -> Self {
        Self { service }
    }

    /// Generate a note from the tracked job's transcript.
    /// Only a completed job qualifies; the specialty recorded on the
    /// job is sent along so the note matches the dictation context.
    pub async fn generate(
        &self,
        jobs: &TranscriptionJobClient<S>,
    ) -> Result<NoteId, NoteGenerationError> {
        let snapshot = jobs.snapshot().await;
        let job_id = snapshot.job_id.ok_or(NoteGenerationError::JobNotStarted)?;

        if snapshot.status != JobStatus::Completed {
            return Err(NoteGenerationError::JobNotCompleted {
                status: snapshot.status,
            });
        }

        let specialty = snapshot.specialty.unwrap_or_default();
        let note_id = self.service.generate_note(&job_id, specialty).await?;
        Ok(note_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use crate::application::ports::JobReport;
    use crate::domain::transcription::{AudioArtifact, JobId, Specialty};

    const NEVER: Duration = Duration::from_secs(3600);

    struct MockService {
        note_calls: AtomicUsize,
        fail_notes: AtomicUsize,
        last_specialty: StdMutex<Option<Specialty>>,
        reports: StdMutex<VecDeque<Result<JobReport, ServiceError>>>,
    }

    impl MockService {
        fn new() -> Self {
            Self {
                note_calls: AtomicUsize::new(0),
                fail_notes: AtomicUsize::new(0),
                last_specialty: StdMutex::new(None),
                reports: StdMutex::new(VecDeque::new()),
            }
        }

        fn with_reports(reports: Vec<Result<JobReport, ServiceError>>) -> Self {
            let service = Self::new();
            *service.reports.lock().unwrap() = reports.into();
            service
        }

        /// Make the next `n` generate_note calls fail
        fn fail_next_notes(&self, n: usize) {
            self.fail_notes.store(n, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl TranscriptionService for MockService {
        async fn start_job(&self, _specialty: Specialty) -> Result<JobId, ServiceError> {
            Ok(JobId::new("job-1"))
        }

        async fn upload_audio(
            &self,
            _audio: &AudioArtifact,
            _specialty: Specialty,
        ) -> Result<JobId, ServiceError> {
            Ok(JobId::new("job-2"))
        }

        async fn job_status(&self, _job_id: &JobId) -> Result<JobReport, ServiceError> {
            self.reports
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(JobReport::InProgress))
        }

        async fn generate_note(
            &self,
            _job_id: &JobId,
            specialty: Specialty,
        ) -> Result<NoteId, ServiceError> {
            self.note_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_specialty.lock().unwrap() = Some(specialty);
            if self
                .fail_notes
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(ServiceError::ApiError("note service down".to_string()));
            }
            Ok(NoteId::new("note-1"))
        }
    }

    #[tokio::test]
    async fn generate_before_start_is_rejected() {
        let service = Arc::new(MockService::new());
        let jobs = TranscriptionJobClient::with_poll_interval(Arc::clone(&service), NEVER);
        let generator = NoteGenerator::new(Arc::clone(&service));

        let err = generator.generate(&jobs).await.unwrap_err();

        assert!(matches!(err, NoteGenerationError::JobNotStarted));
        assert_eq!(service.note_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn generate_while_processing_is_rejected() {
        let service = Arc::new(MockService::new());
        let jobs = TranscriptionJobClient::with_poll_interval(Arc::clone(&service), NEVER);
        let generator = NoteGenerator::new(Arc::clone(&service));

        jobs.start(Specialty::default()).await.unwrap();
        let err = generator.generate(&jobs).await.unwrap_err();

        assert!(matches!(
            err,
            NoteGenerationError::JobNotCompleted {
                status: JobStatus::Processing
            }
        ));
        assert_eq!(service.note_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn generate_after_completion_sends_job_specialty() {
        let service = Arc::new(MockService::with_reports(vec![Ok(JobReport::Completed {
            transcript: "findings".to_string(),
        })]));
        let jobs = TranscriptionJobClient::with_poll_interval(Arc::clone(&service), NEVER);
        let generator = NoteGenerator::new(Arc::clone(&service));

        jobs.start(Specialty::Neurology).await.unwrap();
        jobs.check_now().await;

        let note_id = generator.generate(&jobs).await.unwrap();

        assert_eq!(note_id.as_str(), "note-1");
        assert_eq!(
            *service.last_specialty.lock().unwrap(),
            Some(Specialty::Neurology)
        );
    }

    #[tokio::test]
    async fn generate_can_be_retried_after_service_error() {
        let service = Arc::new(MockService::with_reports(vec![Ok(JobReport::Completed {
            transcript: "findings".to_string(),
        })]));
        let jobs = TranscriptionJobClient::with_poll_interval(Arc::clone(&service), NEVER);
        let generator = NoteGenerator::new(Arc::clone(&service));

        jobs.start(Specialty::default()).await.unwrap();
        jobs.check_now().await;

        service.fail_next_notes(1);
        let err = generator.generate(&jobs).await.unwrap_err();
        assert!(matches!(err, NoteGenerationError::Service(_)));

        // The job is still completed, so a retry succeeds
        let note_id = generator.generate(&jobs).await.unwrap();
        assert_eq!(note_id.as_str(), "note-1");
        assert_eq!(service.note_calls.load(Ordering::SeqCst), 2);
    }
}
