//! Plain UI for pipes, scripts, and CI.

use crate::error::Result;

use super::{OutputMode, ProgressSpinner, SpinnerHandle, UserInterface};

/// Line-oriented output without prompts or spinners.
///
/// Confirmations take their default answer.
pub struct NonInteractiveUI {
    mode: OutputMode,
}

impl NonInteractiveUI {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn data(&mut self, text: &str) {
        println!("{}", text);
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("{}", title);
        }
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        tracing::debug!(question, default, "non-interactive confirm");
        Ok(default)
    }

    fn start_spinner(&mut self, _message: &str) -> Box<dyn SpinnerHandle> {
        Box::new(ProgressSpinner::hidden())
    }

    fn is_interactive(&self) -> bool {
        false
    }
}
