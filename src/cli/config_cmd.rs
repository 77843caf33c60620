//! The `config` subcommand: inspect and edit the on-disk config file

use crate::application::ports::ConfigStore;
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use crate::domain::recording::RecordDuration;
use crate::domain::transcription::Specialty;

use super::args::ConfigAction;
use super::presenter::Presenter;

/// Keys accepted by `set` and `get`, in the order `list` prints them.
pub const CONFIG_KEYS: [&str; 5] = [
    "api_url",
    "api_token",
    "specialty",
    "language_code",
    "max_duration",
];

pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => {
            store.init().await?;
            presenter.success(&format!(
                "Wrote starter config to {}",
                store.path().display()
            ));
            Ok(())
        }
        ConfigAction::Set { key, value } => set_key(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => get_key(store, presenter, &key).await,
        ConfigAction::List => list_keys(store, presenter).await,
        ConfigAction::Path => {
            presenter.output(&store.path().to_string_lossy());
            Ok(())
        }
    }
}

async fn set_key<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    check_value(key, value)?;

    let mut config = store.load().await?;
    *slot(&mut config, key)? = Some(value.to_string());
    store.save(&config).await?;

    let echoed = if key == "api_token" {
        mask_token(value)
    } else {
        value.to_string()
    };
    presenter.success(&format!("{} = {}", key, echoed));
    Ok(())
}

async fn get_key<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    if !CONFIG_KEYS.contains(&key) {
        return Err(unknown_key(key));
    }

    let config = store.load().await?;
    match display_value(&config, key) {
        Some(value) => presenter.output(&value),
        None => presenter.output("(not set)"),
    }
    Ok(())
}

async fn list_keys<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;
    for key in CONFIG_KEYS {
        let value = display_value(&config, key).unwrap_or_else(|| "(not set)".to_string());
        presenter.key_value(key, &value);
    }
    Ok(())
}

/// The config field behind `key`, writable.
fn slot<'a>(config: &'a mut AppConfig, key: &str) -> Result<&'a mut Option<String>, ConfigError> {
    match key {
        "api_url" => Ok(&mut config.api_url),
        "api_token" => Ok(&mut config.api_token),
        "specialty" => Ok(&mut config.specialty),
        "language_code" => Ok(&mut config.language_code),
        "max_duration" => Ok(&mut config.max_duration),
        _ => Err(unknown_key(key)),
    }
}

/// What `get` and `list` print for `key`; the token comes out masked.
fn display_value(config: &AppConfig, key: &str) -> Option<String> {
    match key {
        "api_url" => config.api_url.clone(),
        "api_token" => config.api_token.as_deref().map(mask_token),
        "specialty" => config.specialty.clone(),
        "language_code" => config.language_code.clone(),
        "max_duration" => config.max_duration.clone(),
        _ => None,
    }
}

/// Reject values that would break later runs before they reach the file.
fn check_value(key: &str, value: &str) -> Result<(), ConfigError> {
    let reject = |message: String| ConfigError::InvalidValue {
        key: key.to_string(),
        message,
    };

    match key {
        "api_url" => {
            if value.starts_with("http://") || value.starts_with("https://") {
                Ok(())
            } else {
                Err(reject("expected an http:// or https:// URL".to_string()))
            }
        }
        "specialty" => value
            .parse::<Specialty>()
            .map(|_| ())
            .map_err(|e| reject(e.to_string())),
        "max_duration" => value
            .parse::<RecordDuration>()
            .map(|_| ())
            .map_err(|e| reject(e.to_string())),
        "api_token" | "language_code" => Ok(()),
        _ => Err(unknown_key(key)),
    }
}

fn unknown_key(key: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: format!("unknown key; valid keys are {}", CONFIG_KEYS.join(", ")),
    }
}

/// First and last four characters of the token; everything shorter than
/// nine characters is starred out entirely.
fn mask_token(token: &str) -> String {
    let count = token.chars().count();
    if count <= 8 {
        return "*".repeat(count);
    }
    let head: String = token.chars().take(4).collect();
    let tail: String = token.chars().skip(count - 4).collect();
    format!("{}...{}", head, tail)
}
