//! Config file storage under the XDG config directory

use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Stores the config as TOML at `<config dir>/scribely/config.toml`.
pub struct XdgConfigStore {
    path: PathBuf,
}

impl XdgConfigStore {
    pub fn new() -> Self {
        Self {
            path: default_config_path(),
        }
    }

    /// Back the store with an explicit file instead of the XDG location.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("scribely")
        .join("config.toml")
}

impl Default for XdgConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConfigStore for XdgConfigStore {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(AppConfig::empty()),
            Err(e) => return Err(ConfigError::Read(e.to_string())),
        };

        toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        let rendered =
            toml::to_string_pretty(config).map_err(|e| ConfigError::Write(e.to_string()))?;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ConfigError::Write(e.to_string()))?;
        }

        fs::write(&self.path, rendered)
            .await
            .map_err(|e| ConfigError::Write(e.to_string()))
    }

    fn path(&self) -> PathBuf {
        self.path.clone()
    }

    fn exists(&self) -> bool {
        self.path.exists()
    }
}
