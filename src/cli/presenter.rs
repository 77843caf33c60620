//! Terminal output for the CLI

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

const SPINNER_TICKS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";
const PROGRESS_BAR_WIDTH: u64 = 20;

/// Writes status lines to stderr and result text to stdout, and owns the
/// one live spinner so in-place updates land on a single line.
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    pub fn new() -> Self {
        Self { spinner: None }
    }

    fn stderr_line(&self, symbol: ColoredString, message: &str) {
        eprintln!("{} {}", symbol, message);
    }

    /// Replace any live spinner with a fresh one showing `message`.
    pub fn start_spinner(&mut self, message: &str) {
        self.stop_spinner();
        let spinner = ProgressBar::new_spinner().with_message(message.to_string());
        spinner.set_style(spinner_style());
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    pub fn update_spinner(&self, message: &str) {
        if let Some(spinner) = &self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Finish the spinner, leaving a green check line behind.
    pub fn spinner_success(&mut self, message: &str) {
        self.finish_spinner(Some(format!("{} {}", "✓".green(), message)));
    }

    /// Finish the spinner, leaving a red cross line behind.
    pub fn spinner_fail(&mut self, message: &str) {
        self.finish_spinner(Some(format!("{} {}", "✗".red(), message)));
    }

    /// Erase the spinner without leaving a line.
    pub fn stop_spinner(&mut self) {
        self.finish_spinner(None);
    }

    fn finish_spinner(&mut self, final_line: Option<String>) {
        let Some(spinner) = self.spinner.take() else {
            return;
        };
        match final_line {
            Some(line) => spinner.finish_with_message(line),
            None => spinner.finish_and_clear(),
        }
    }

    pub fn info(&self, message: &str) {
        self.stderr_line("ℹ".cyan(), message);
    }

    pub fn success(&self, message: &str) {
        self.stderr_line("✓".green(), message);
    }

    pub fn warn(&self, message: &str) {
        self.stderr_line("⚠".yellow(), message);
    }

    pub fn error(&self, message: &str) {
        self.stderr_line("✗".red(), message);
    }

    /// Result text on stdout; status stays on stderr.
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// `key: value` line for `config list` output.
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }

    /// mm:ss wall clock for an open-ended take.
    pub fn format_elapsed(&self, elapsed_secs: u64) -> String {
        format!("{:02}:{:02}", elapsed_secs / 60, elapsed_secs % 60)
    }

    /// Fixed-width bar plus a `Ns / Ms` counter for a limited take.
    pub fn format_progress(&self, elapsed_secs: u64, limit_secs: u64) -> String {
        let filled = if limit_secs == 0 {
            0
        } else {
            (PROGRESS_BAR_WIDTH * elapsed_secs.min(limit_secs) / limit_secs) as usize
        };
        let empty = PROGRESS_BAR_WIDTH as usize - filled;

        let bar = format!("{}{}", "█".repeat(filled).cyan(), "░".repeat(empty));
        format!("[{}] {:>3}s / {}s", bar, elapsed_secs, limit_secs)
    }

    /// One-line take status: label plus either the wall clock or the bar.
    pub fn update_recording_progress(
        &self,
        status: &str,
        elapsed_secs: u64,
        limit_secs: Option<u64>,
    ) {
        let clock = match limit_secs {
            Some(limit) => self.format_progress(elapsed_secs, limit),
            None => self.format_elapsed(elapsed_secs),
        };
        self.update_spinner(&format!("{} {}", status, clock));
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_spinner()
        .tick_chars(SPINNER_TICKS)
        .template("{spinner:.cyan} {msg}")
        .unwrap()
}
