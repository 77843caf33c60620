//! Transcription service adapters

mod scribely;

pub use scribely::ScribelyApiClient;
