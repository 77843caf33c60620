//! Value objects, entities, and domain errors; no I/O lives here

pub mod config;
pub mod error;
pub mod note;
pub mod recording;
pub mod transcription;

pub use config::AppConfig;
pub use error::*;
pub use note::NoteId;
pub use recording::{RecordDuration, RecordingSession, RecordingStatus};
pub use transcription::{AudioArtifact, AudioMimeType, JobId, Specialty, TranscriptionJob};
