//! Interactive terminal UI.

use console::Term;
use std::io::Write;

use crate::error::Result;

use super::prompts::confirm;
use super::{CardsyncTheme, NonInteractiveUI, OutputMode, ProgressSpinner, SpinnerHandle, UserInterface};

/// UI for an attached terminal.
pub struct TerminalUI {
    term: Term,
    theme: CardsyncTheme,
    mode: OutputMode,
}

impl TerminalUI {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            term: Term::stdout(),
            theme: CardsyncTheme::for_terminal(),
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", msg).ok();
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        let line = self.theme.format_error(msg);
        writeln!(Term::stderr(), "{}", line).ok();
    }

    fn data(&mut self, text: &str) {
        writeln!(self.term, "{}", text).ok();
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.term, "\n{}\n", self.theme.format_header(title)).ok();
        }
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        confirm(question, default, &self.term)
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() {
            Box::new(ProgressSpinner::new(message))
        } else {
            Box::new(ProgressSpinner::hidden())
        }
    }

    fn is_interactive(&self) -> bool {
        self.term.is_term()
    }
}

/// Terminal UI when stdout is a TTY and interaction is allowed, plain
/// output otherwise.
pub fn create_ui(interactive: bool, mode: OutputMode) -> Box<dyn UserInterface> {
    if interactive && Term::stdout().is_term() {
        Box::new(TerminalUI::new(mode))
    } else {
        Box::new(NonInteractiveUI::new(mode))
    }
}
