//! Audio capture (cpal) and FLAC encoding adapters

mod cpal_capture;
mod flac_encoder;

pub use cpal_capture::CpalCaptureDevice;
pub use flac_encoder::{encode_capture, EncodingError};
