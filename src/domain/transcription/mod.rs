//! Transcription domain module

mod audio;
mod job;
mod specialty;

pub use audio::{AudioArtifact, AudioMimeType, CapturedAudio, MAX_UPLOAD_BYTES};
pub use job::{InvalidJobTransition, JobId, JobStatus, TranscriptionJob};
pub use specialty::{Specialty, ALL_SPECIALTIES};
