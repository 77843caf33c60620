//! Domain error types

use thiserror::Error;

/// A time-limit string outside the `<n>s` / `<n>m` / `<n>m<n>s` grammar.
#[derive(Debug, Clone, Error)]
#[error("Unrecognized duration {input:?}; use forms like 30s, 2m, or 1m30s")]
pub struct DurationParseError {
    pub input: String,
}

/// A specialty name outside the supported set.
#[derive(Debug, Clone, Error)]
#[error("Unknown specialty {input:?}; expected one of primary_care, cardiology, neurology, oncology, radiology, urology")]
pub struct InvalidSpecialtyError {
    pub input: String,
}

/// Failures around the on-disk configuration file.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Could not read config file: {0}")]
    Read(String),

    #[error("Config file is not valid TOML: {0}")]
    Parse(String),

    #[error("Could not write config file: {0}")]
    Write(String),

    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    #[error("Config file already exists at {0}")]
    AlreadyInitialized(String),
}
