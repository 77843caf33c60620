//! Scribely CLI entry point

use std::process::ExitCode;

use clap::Parser;

use scribely::cli::{
    app::{init_tracing, load_merged_config, run_record, run_upload, EXIT_ERROR, EXIT_USAGE_ERROR},
    args::{Cli, Commands, RecordOptions, UploadOptions},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use scribely::domain::config::AppConfig;
use scribely::domain::recording::RecordDuration;
use scribely::domain::transcription::Specialty;
use scribely::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let presenter = Presenter::new();

    match cli.command {
        Commands::Config { action } => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
        Commands::Record {
            specialty,
            language,
            max_duration,
            save,
            note,
        } => {
            // Build CLI config from args
            let cli_config = AppConfig {
                api_token: None, // API token comes from env/file only
                specialty: specialty.map(|s| Specialty::from(s).to_string()),
                language_code: language,
                max_duration,
                ..Default::default()
            };

            let config = load_merged_config(cli_config).await;

            // Parse max duration
            let max_duration = match config.max_duration.as_ref() {
                Some(s) => match s.parse::<RecordDuration>() {
                    Ok(d) => Some(d),
                    Err(e) => {
                        presenter.error(&format!("Invalid max-duration: {}", e));
                        return ExitCode::from(EXIT_USAGE_ERROR);
                    }
                },
                None => None,
            };

            let options = RecordOptions {
                api_url: config.api_url_or_default().to_string(),
                specialty: config.specialty_or_default(),
                language_code: config.language_code_or_default().to_string(),
                max_duration,
                save,
                note,
            };

            run_record(options).await
        }
        Commands::Upload {
            file,
            specialty,
            language,
            note,
        } => {
            let cli_config = AppConfig {
                api_token: None,
                specialty: specialty.map(|s| Specialty::from(s).to_string()),
                language_code: language,
                ..Default::default()
            };

            let config = load_merged_config(cli_config).await;

            let options = UploadOptions {
                api_url: config.api_url_or_default().to_string(),
                file,
                specialty: config.specialty_or_default(),
                language_code: config.language_code_or_default().to_string(),
                note,
            };

            run_upload(options).await
        }
    }
}
