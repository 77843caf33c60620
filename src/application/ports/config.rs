//! Port for the on-disk configuration file

use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Persistence seam for [`AppConfig`].
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read the stored config. A missing file is an empty config, not an error.
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Persist `config`, creating parent directories as needed.
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    /// Location of the backing file.
    fn path(&self) -> PathBuf;

    /// Whether the backing file is present on disk.
    fn exists(&self) -> bool;

    /// Write a starter config pre-populated with defaults. Refuses to
    /// overwrite a file that is already there.
    async fn init(&self) -> Result<(), ConfigError> {
        if self.exists() {
            return Err(ConfigError::AlreadyInitialized(
                self.path().display().to_string(),
            ));
        }
        self.save(&AppConfig::defaults()).await
    }
}
