//! Main app runners for the record and upload flows

use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::signal;
use tracing::debug;

use crate::application::ports::ConfigStore;
use crate::application::{NoteGenerator, RecordingController, TranscriptionJobClient};
use crate::domain::config::AppConfig;
use crate::domain::recording::RecordingStatus;
use crate::domain::transcription::{AudioMimeType, JobStatus};
use crate::infrastructure::recording::encode_capture;
use crate::infrastructure::{CpalCaptureDevice, ScribelyApiClient, XdgConfigStore};

use super::args::{RecordOptions, UploadOptions};
use super::presenter::Presenter;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Refresh period for the status line while recording or waiting
const UI_TICK: Duration = Duration::from_millis(200);

/// Run an interactive recording session and transcribe it
pub async fn run_record(options: RecordOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let service = match build_service(&options.api_url, &options.language_code).await {
        Ok(service) => service,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let jobs = Arc::new(TranscriptionJobClient::new(service.clone()));
    let controller = RecordingController::new(CpalCaptureDevice::new(), jobs.clone());

    if let Err(e) = controller.start(options.specialty).await {
        presenter.error(&e.to_string());
        return ExitCode::from(EXIT_ERROR);
    }

    presenter.info(&format!(
        "Recording ({}) — Enter pauses/resumes, Ctrl+C stops",
        options.specialty.label()
    ));
    presenter.start_spinner("Recording 00:00");

    let limit_secs = options.max_duration.map(|d| d.as_secs());
    let mut ui_tick = tokio::time::interval(UI_TICK);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    let time_limit = async {
        match options.max_duration {
            Some(limit) => tokio::time::sleep(limit.as_std()).await,
            None => std::future::pending().await,
        }
    };
    tokio::pin!(time_limit);

    loop {
        tokio::select! {
            _ = ui_tick.tick() => {
                let status = controller.status().await;
                let elapsed = controller.elapsed_seconds().await;
                let label = match status {
                    RecordingStatus::Paused => "Paused",
                    _ => "Recording",
                };
                presenter.update_recording_progress(label, elapsed, limit_secs);
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(_)) => {
                        if let Err(e) = controller.toggle_pause().await {
                            debug!("pause toggle rejected: {e}");
                        }
                    }
                    // stdin closed; keep recording until a signal or the limit
                    Ok(None) | Err(_) => stdin_open = false,
                }
            }
            _ = signal::ctrl_c() => break,
            _ = &mut time_limit => {
                presenter.update_spinner("Time limit reached");
                break;
            }
        }
    }

    presenter.stop_spinner();

    let capture = match controller.stop().await {
        Ok(capture) => capture,
        Err(e) => {
            presenter.error(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    };
    presenter.success(&format!(
        "Recording stopped ({:.1}s captured)",
        capture.duration_seconds()
    ));

    // Keep a local FLAC copy when asked
    if let Some(path) = options.save.as_ref() {
        match encode_capture(&capture) {
            Ok(artifact) => match tokio::fs::write(path, artifact.data()).await {
                Ok(()) => presenter.success(&format!(
                    "Saved {} to {}",
                    artifact.human_readable_size(),
                    path.display()
                )),
                Err(e) => presenter.error(&format!("Failed to write {}: {}", path.display(), e)),
            },
            Err(e) => presenter.error(&format!("Failed to encode recording: {}", e)),
        }
    }

    if jobs.status().await == JobStatus::Unstarted {
        presenter.error("No transcription job was started for this recording");
        return ExitCode::from(EXIT_ERROR);
    }

    finish_transcription(&mut presenter, &jobs, service, options.note).await
}

/// Upload an audio file and wait for its transcription
pub async fn run_upload(options: UploadOptions) -> ExitCode {
    let mut presenter = Presenter::new();

    let mime = options
        .file
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(AudioMimeType::from_extension);
    let mime = match mime {
        Some(mime) => mime,
        None => {
            presenter.error(&format!(
                "Unrecognized audio file type: {}",
                options.file.display()
            ));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let data = match tokio::fs::read(&options.file).await {
        Ok(data) => data,
        Err(e) => {
            presenter.error(&format!("Failed to read {}: {}", options.file.display(), e));
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let service = match build_service(&options.api_url, &options.language_code).await {
        Ok(service) => service,
        Err(e) => {
            presenter.error(&e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let jobs = Arc::new(TranscriptionJobClient::new(service.clone()));

    presenter.start_spinner(&format!("Uploading {}", options.file.display()));
    match jobs.upload(data, mime.as_str(), options.specialty).await {
        Ok(job_id) => {
            debug!(job_id = %job_id, "upload accepted");
            presenter.spinner_success("Upload accepted");
        }
        Err(e) => {
            presenter.spinner_fail(&e.to_string());
            return ExitCode::from(EXIT_ERROR);
        }
    }

    finish_transcription(&mut presenter, &jobs, service, options.note).await
}

/// Watch the tracked job until it reaches a terminal status, print the
/// transcript, and optionally generate a clinical note.
async fn finish_transcription(
    presenter: &mut Presenter,
    jobs: &TranscriptionJobClient<ScribelyApiClient>,
    service: Arc<ScribelyApiClient>,
    generate_note: bool,
) -> ExitCode {
    presenter.start_spinner("Transcribing...");

    while !jobs.is_terminal().await {
        tokio::select! {
            _ = tokio::time::sleep(UI_TICK) => {}
            _ = signal::ctrl_c() => {
                presenter.stop_spinner();
                let snapshot = jobs.snapshot().await;
                match snapshot.job_id {
                    Some(id) => presenter.warn(&format!(
                        "Stopped waiting; job {} may still finish server-side",
                        id
                    )),
                    None => presenter.warn("Stopped waiting"),
                }
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    let snapshot = jobs.snapshot().await;
    match snapshot.status {
        JobStatus::Completed => {
            presenter.spinner_success("Transcription complete");
            if let Some(transcript) = snapshot.transcript.as_deref() {
                presenter.output(transcript);
            }
        }
        JobStatus::Failed => {
            let reason = snapshot
                .failure_reason
                .unwrap_or_else(|| "Transcription failed".to_string());
            presenter.spinner_fail(&reason);
            return ExitCode::from(EXIT_ERROR);
        }
        // The wait loop only exits on a terminal status
        _ => return ExitCode::from(EXIT_ERROR),
    }

    if generate_note {
        let generator = NoteGenerator::new(service);
        match generator.generate(jobs).await {
            Ok(note_id) => presenter.success(&format!("Note generated: {}", note_id)),
            Err(e) => {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    ExitCode::from(EXIT_SUCCESS)
}

/// Build the API client from resolved settings and the stored token
async fn build_service(
    api_url: &str,
    language_code: &str,
) -> Result<Arc<ScribelyApiClient>, String> {
    let token = get_api_token().await?;
    Ok(Arc::new(ScribelyApiClient::with_language_code(
        api_url,
        token,
        language_code,
    )))
}

/// Get API token from environment or config file
pub async fn get_api_token() -> Result<String, String> {
    // Check environment first
    if let Ok(token) = env::var("SCRIBELY_API_TOKEN") {
        if !token.is_empty() {
            return Ok(token);
        }
    }

    // Check config file
    let store = XdgConfigStore::new();
    let config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    config.api_token.ok_or_else(|| {
        "Missing API token. Set SCRIBELY_API_TOKEN environment variable or run 'scribely config set api_token <token>'".to_string()
    })
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = store.load().await.unwrap_or_else(|_| AppConfig::empty());

    // Build env config
    let env_config = AppConfig {
        api_url: env::var("SCRIBELY_API_URL").ok().filter(|s| !s.is_empty()),
        api_token: env::var("SCRIBELY_API_TOKEN").ok().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

/// Install the diagnostic subscriber; SCRIBELY_LOG controls verbosity
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("SCRIBELY_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
