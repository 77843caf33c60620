//! Application configuration value object

use serde::{Deserialize, Serialize};

use crate::domain::transcription::Specialty;

/// Base URL used when no `api_url` is configured anywhere
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// BCP-47 code used when no `language_code` is configured anywhere
pub const DEFAULT_LANGUAGE_CODE: &str = "en-US";

/// The five keys of the config file, each optional so a file carrying any
/// subset of them loads cleanly. Layers (defaults, file, environment,
/// flags) are combined with [`AppConfig::merge`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub api_url: Option<String>,
    pub api_token: Option<String>,
    pub specialty: Option<String>,
    pub language_code: Option<String>,
    pub max_duration: Option<String>,
}

impl AppConfig {
    /// The bottom layer: sensible values for everything but the token,
    /// which has no sensible default.
    pub fn defaults() -> Self {
        Self {
            api_url: Some(DEFAULT_API_URL.to_string()),
            specialty: Some("primary_care".to_string()),
            language_code: Some(DEFAULT_LANGUAGE_CODE.to_string()),
            ..Self::default()
        }
    }

    /// A config with nothing set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Lay `overlay` on top of `self`. Overlay fields left `None` fall
    /// through to the value underneath.
    pub fn merge(self, overlay: Self) -> Self {
        fn pick(over: Option<String>, under: Option<String>) -> Option<String> {
            over.or(under)
        }

        Self {
            api_url: pick(overlay.api_url, self.api_url),
            api_token: pick(overlay.api_token, self.api_token),
            specialty: pick(overlay.specialty, self.specialty),
            language_code: pick(overlay.language_code, self.language_code),
            max_duration: pick(overlay.max_duration, self.max_duration),
        }
    }

    pub fn api_url_or_default(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    /// The configured specialty, falling back to the default when unset
    /// or unparseable.
    pub fn specialty_or_default(&self) -> Specialty {
        match &self.specialty {
            Some(raw) => raw.parse().unwrap_or_default(),
            None => Specialty::default(),
        }
    }

    pub fn language_code_or_default(&self) -> &str {
        self.language_code.as_deref().unwrap_or(DEFAULT_LANGUAGE_CODE)
    }
}
