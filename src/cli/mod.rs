//! Argument parsing, terminal output, and the record/upload runners

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod presenter;

pub use app::{run_record, run_upload, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, RecordOptions, SpecialtyArg, UploadOptions};
pub use presenter::Presenter;
