//! Scribely API service adapter

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ports::{JobReport, ServiceError, TranscriptionService};
use crate::domain::config::DEFAULT_LANGUAGE_CODE;
use crate::domain::note::NoteId;
use crate::domain::transcription::{AudioArtifact, JobId, Specialty};

// Request types for the Scribely API

#[derive(Debug, Serialize)]
struct StartJobRequest<'a> {
    specialty: &'a str,
    language_code: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerateNoteRequest<'a> {
    transcription_id: &'a str,
    specialty: &'a str,
}

// Response types for the Scribely API

#[derive(Debug, Deserialize)]
struct JobResponse {
    job_id: String,
    status: String,
    #[serde(default)]
    transcript: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NoteResponse {
    #[serde(rename = "_id")]
    id: String,
}

/// HTTP client for the Scribely transcription service
pub struct ScribelyApiClient {
    base_url: String,
    api_token: String,
    language_code: String,
    client: reqwest::Client,
}

impl ScribelyApiClient {
    /// Create a new client for the given service
    pub fn new(base_url: impl Into<String>, api_token: impl Into<String>) -> Self {
        Self::with_language_code(base_url, api_token, DEFAULT_LANGUAGE_CODE)
    }

    /// Create a new client with a custom audio language
    pub fn with_language_code(
        base_url: impl Into<String>,
        api_token: impl Into<String>,
        language_code: impl Into<String>,
    ) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            base_url,
            api_token: api_token.into(),
            language_code: language_code.into(),
            client: reqwest::Client::new(),
        }
    }

    fn start_url(&self) -> String {
        format!("{}/api/transcribe/start", self.base_url)
    }

    fn upload_url(&self) -> String {
        format!("{}/api/transcribe/upload", self.base_url)
    }

    fn status_url(&self, job_id: &JobId) -> String {
        format!("{}/api/transcribe/{}", self.base_url, job_id)
    }

    fn notes_url(&self) -> String {
        format!("{}/api/notes/generate", self.base_url)
    }

    /// Map HTTP-level failures before touching the body
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ServiceError> {
        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ServiceError::Unauthorized);
        }

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ServiceError::ApiError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        Ok(response)
    }

    /// Translate the service's job document into a report
    fn to_report(job: JobResponse) -> Result<JobReport, ServiceError> {
        match job.status.as_str() {
            "in_progress" => Ok(JobReport::InProgress),
            "completed" => Ok(JobReport::Completed {
                transcript: job.transcript.unwrap_or_default(),
            }),
            "failed" => Ok(JobReport::Failed { reason: job.error }),
            other => Err(ServiceError::ParseError(format!(
                "Unknown job status: {}",
                other
            ))),
        }
    }

    async fn parse_job(response: reqwest::Response) -> Result<JobResponse, ServiceError> {
        response
            .json()
            .await
            .map_err(|e| ServiceError::ParseError(e.to_string()))
    }
}

#[async_trait]
impl TranscriptionService for ScribelyApiClient {
    async fn start_job(&self, specialty: Specialty) -> Result<JobId, ServiceError> {
        let body = StartJobRequest {
            specialty: specialty.as_str(),
            language_code: &self.language_code,
        };

        let response = self
            .client
            .post(self.start_url())
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::RequestFailed(e.to_string()))?;

        let response = Self::check_status(response).await?;
        let job = Self::parse_job(response).await?;

        debug!(job_id = %job.job_id, "transcription job opened");
        Ok(JobId::new(job.job_id))
    }

    async fn upload_audio(
        &self,
        audio: &AudioArtifact,
        specialty: Specialty,
    ) -> Result<JobId, ServiceError> {
        let file_part = reqwest::multipart::Part::bytes(audio.data().to_vec())
            .file_name(format!("dictation.{}", audio.mime_type().extension()))
            .mime_str(audio.mime_type().as_str())
            .map_err(|e| ServiceError::RequestFailed(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .part("audio_file", file_part)
            .text("specialty", specialty.as_str())
            .text("language_code", self.language_code.clone());

        let response = self
            .client
            .post(self.upload_url())
            .bearer_auth(&self.api_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ServiceError::RequestFailed(e.to_string()))?;

        let response = Self::check_status(response).await?;
        let job = Self::parse_job(response).await?;

        debug!(job_id = %job.job_id, size = audio.size_bytes(), "audio uploaded");
        Ok(JobId::new(job.job_id))
    }

    async fn job_status(&self, job_id: &JobId) -> Result<JobReport, ServiceError> {
        let response = self
            .client
            .get(self.status_url(job_id))
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| ServiceError::RequestFailed(e.to_string()))?;

        let response = Self::check_status(response).await?;
        let job = Self::parse_job(response).await?;

        Self::to_report(job)
    }

    async fn generate_note(
        &self,
        job_id: &JobId,
        specialty: Specialty,
    ) -> Result<NoteId, ServiceError> {
        let body = GenerateNoteRequest {
            transcription_id: job_id.as_str(),
            specialty: specialty.as_str(),
        };

        let response = self
            .client
            .post(self.notes_url())
            .bearer_auth(&self.api_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| ServiceError::RequestFailed(e.to_string()))?;

        let response = Self::check_status(response).await?;
        let note: NoteResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::ParseError(e.to_string()))?;

        debug!(note_id = %note.id, "clinical note generated");
        Ok(NoteId::new(note.id))
    }
}
