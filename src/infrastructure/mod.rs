//! Port implementations backed by cpal, flacenc, reqwest, and the filesystem

pub mod config;
pub mod recording;
pub mod transcription;

pub use config::XdgConfigStore;
pub use recording::CpalCaptureDevice;
pub use transcription::ScribelyApiClient;
