//! Use cases plus the port traits they drive

pub mod job;
pub mod note;
pub mod ports;
pub mod recording;

pub use job::{JobSnapshot, JobStartError, TranscriptionJobClient, POLL_INTERVAL};
pub use note::{NoteGenerationError, NoteGenerator};
pub use recording::{RecordingControlError, RecordingController};
