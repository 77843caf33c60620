//! FLAC encoding for captured dictation audio
//!
//! The capture pipeline hands over mono 16-bit PCM; this module turns a
//! finished take into a lossless FLAC artifact for upload or for saving
//! next to the transcript. The stream keeps whatever sample rate the
//! device recorded at.

use flacenc::bitsink::ByteSink;
use flacenc::component::BitRepr;
use flacenc::config;
use flacenc::error::Verify;
use flacenc::source::MemSource;

use crate::domain::transcription::{AudioArtifact, AudioMimeType, CapturedAudio};

const BITS_PER_SAMPLE: usize = 16;
const CHANNELS: usize = 1;

/// Encode a finished take into a FLAC artifact ready for upload.
pub fn encode_capture(audio: &CapturedAudio) -> Result<AudioArtifact, EncodingError> {
    if audio.is_empty() {
        return Err(EncodingError::EmptyCapture);
    }

    // flacenc wants samples widened to i32
    let widened: Vec<i32> = audio.samples().iter().map(|&s| i32::from(s)).collect();
    let bytes = flac_bytes(&widened, audio.sample_rate())?;
    Ok(AudioArtifact::new(bytes, AudioMimeType::Flac))
}

fn flac_bytes(samples: &[i32], sample_rate: u32) -> Result<Vec<u8>, EncodingError> {
    let config = config::Encoder::default()
        .into_verified()
        .map_err(|(_, e)| EncodingError::Config(format!("{:?}", e)))?;

    let source = MemSource::from_samples(samples, CHANNELS, BITS_PER_SAMPLE, sample_rate as usize);

    let stream = flacenc::encode_with_fixed_block_size(&config, source, config.block_size)
        .map_err(|e| EncodingError::Encode(format!("{:?}", e)))?;

    let mut sink = ByteSink::new();
    stream
        .write(&mut sink)
        .map_err(|e| EncodingError::Write(e.to_string()))?;

    Ok(sink.into_inner())
}

#[derive(Debug, thiserror::Error)]
pub enum EncodingError {
    #[error("No audio was captured")]
    EmptyCapture,

    #[error("FLAC encoder configuration rejected: {0}")]
    Config(String),

    #[error("FLAC encoding failed: {0}")]
    Encode(String),

    #[error("Could not serialize FLAC stream: {0}")]
    Write(String),
}
