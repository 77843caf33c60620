//! Audio value objects

use std::fmt;

use crate::domain::recording::AudioFragment;

/// Upload size limit enforced before any network call (25 MiB)
pub const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Supported audio MIME types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AudioMimeType {
    Flac,
    Wav,
    Mp3,
    Ogg,
    Webm,
    Mp4,
}

impl AudioMimeType {
    /// Get the MIME type string
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Flac => "audio/flac",
            Self::Wav => "audio/wav",
            Self::Mp3 => "audio/mpeg",
            Self::Ogg => "audio/ogg",
            Self::Webm => "audio/webm",
            Self::Mp4 => "audio/mp4",
        }
    }

    /// Get the file extension
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Flac => "flac",
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
            Self::Ogg => "ogg",
            Self::Webm => "webm",
            Self::Mp4 => "mp4",
        }
    }

    /// Classify a MIME content type. Anything outside the audio
    /// category maps to `None`; parameters after ';' are ignored.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or("")
            .trim()
            .to_lowercase();

        match essence.as_str() {
            "audio/flac" | "audio/x-flac" => Some(Self::Flac),
            "audio/wav" | "audio/x-wav" | "audio/wave" => Some(Self::Wav),
            "audio/mp3" | "audio/mpeg" => Some(Self::Mp3),
            "audio/ogg" => Some(Self::Ogg),
            "audio/webm" => Some(Self::Webm),
            "audio/mp4" | "audio/m4a" | "audio/x-m4a" => Some(Self::Mp4),
            _ => None,
        }
    }

    /// Classify a file extension (without the dot)
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.trim().to_lowercase().as_str() {
            "flac" => Some(Self::Flac),
            "wav" => Some(Self::Wav),
            "mp3" => Some(Self::Mp3),
            "ogg" => Some(Self::Ogg),
            "webm" => Some(Self::Webm),
            "mp4" | "m4a" => Some(Self::Mp4),
            _ => None,
        }
    }
}

impl fmt::Display for AudioMimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for AudioMimeType {
    fn default() -> Self {
        Self::Flac
    }
}

/// Value object for a finalized audio payload ready for upload or
/// saving. Contains the encoded bytes and their MIME type.
#[derive(Debug, Clone)]
pub struct AudioArtifact {
    data: Vec<u8>,
    mime_type: AudioMimeType,
}

impl AudioArtifact {
    /// Create an artifact from encoded bytes
    pub fn new(data: Vec<u8>, mime_type: AudioMimeType) -> Self {
        Self { data, mime_type }
    }

    /// Get the encoded bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Get the MIME type
    pub fn mime_type(&self) -> AudioMimeType {
        self.mime_type
    }

    /// Get the size in bytes
    pub fn size_bytes(&self) -> usize {
        self.data.len()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}

/// Raw capture output of one recording take: the concatenated PCM
/// fragments (16-bit little-endian, mono) and the device sample rate.
#[derive(Debug, Clone)]
pub struct CapturedAudio {
    pcm: Vec<u8>,
    sample_rate: u32,
}

impl CapturedAudio {
    /// Create from already-concatenated PCM bytes
    pub fn new(pcm: Vec<u8>, sample_rate: u32) -> Self {
        Self { pcm, sample_rate }
    }

    /// Finalize a take by concatenating its fragments in arrival order
    pub fn from_fragments(fragments: Vec<AudioFragment>, sample_rate: u32) -> Self {
        Self {
            pcm: fragments.concat(),
            sample_rate,
        }
    }

    /// Get the raw PCM bytes
    pub fn pcm(&self) -> &[u8] {
        &self.pcm
    }

    /// Get the capture sample rate in Hz
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Whether any audio was captured
    pub fn is_empty(&self) -> bool {
        self.pcm.is_empty()
    }

    /// Decode the PCM bytes into i16 samples
    pub fn samples(&self) -> Vec<i16> {
        self.pcm
            .chunks_exact(2)
            .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
            .collect()
    }

    /// Approximate duration of the captured audio in seconds
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        (self.pcm.len() / 2) as f64 / self.sample_rate as f64
    }
}
