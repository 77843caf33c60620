//! Command-line definitions (clap derive)

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::domain::recording::RecordDuration;
use crate::domain::transcription::Specialty;

/// Scribely - clinical dictation and transcription client
#[derive(Parser, Debug)]
#[command(name = "scribely")]
#[command(version = "0.1.0")]
#[command(about = "Record or upload clinical dictations and turn them into notes")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Record a dictation from the microphone and transcribe it
    Record {
        /// Medical specialty guiding transcription (e.g., cardiology)
        #[arg(short = 's', long, value_name = "SPECIALTY")]
        specialty: Option<SpecialtyArg>,

        /// Spoken language code (e.g., en-US)
        #[arg(short = 'l', long, value_name = "CODE")]
        language: Option<String>,

        /// Stop recording automatically after this long (e.g., 30s, 5m)
        #[arg(long, value_name = "TIME")]
        max_duration: Option<String>,

        /// Write the captured audio as FLAC to this path
        #[arg(long, value_name = "PATH")]
        save: Option<PathBuf>,

        /// Generate a clinical note once transcription completes
        #[arg(short = 'n', long)]
        note: bool,
    },
    /// Upload an existing audio file for transcription
    Upload {
        /// Audio file to upload (flac, wav, mp3, ogg, webm, m4a)
        file: PathBuf,

        /// Medical specialty guiding transcription (e.g., cardiology)
        #[arg(short = 's', long, value_name = "SPECIALTY")]
        specialty: Option<SpecialtyArg>,

        /// Spoken language code (e.g., en-US)
        #[arg(short = 'l', long, value_name = "CODE")]
        language: Option<String>,

        /// Generate a clinical note once transcription completes
        #[arg(short = 'n', long)]
        note: bool,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Actions under `scribely config`
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Specialty as a clap value enum, so `--help` lists the choices.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SpecialtyArg {
    PrimaryCare,
    Cardiology,
    Neurology,
    Oncology,
    Radiology,
    Urology,
}

impl From<SpecialtyArg> for Specialty {
    fn from(arg: SpecialtyArg) -> Self {
        match arg {
            SpecialtyArg::PrimaryCare => Specialty::PrimaryCare,
            SpecialtyArg::Cardiology => Specialty::Cardiology,
            SpecialtyArg::Neurology => Specialty::Neurology,
            SpecialtyArg::Oncology => Specialty::Oncology,
            SpecialtyArg::Radiology => Specialty::Radiology,
            SpecialtyArg::Urology => Specialty::Urology,
        }
    }
}

/// Record settings after all config layers are merged
#[derive(Debug, Clone)]
pub struct RecordOptions {
    pub api_url: String,
    pub specialty: Specialty,
    pub language_code: String,
    pub max_duration: Option<RecordDuration>,
    pub save: Option<PathBuf>,
    pub note: bool,
}

/// Upload settings after all config layers are merged
#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub api_url: String,
    pub file: PathBuf,
    pub specialty: Specialty,
    pub language_code: String,
    pub note: bool,
}
