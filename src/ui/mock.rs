//! Mock UI for testing.
//!
//! `MockUI` captures every interaction for later assertion and answers
//! confirmations from a queue.
//!
//! ```
//! use cardsync::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.queue_confirms([true]);
//!
//! assert!(ui.confirm("Clear?", false).unwrap());
//! ui.success("Cleared");
//! assert_eq!(ui.successes(), ["Cleared"]);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::Result;

use super::{OutputMode, SpinnerHandle, UserInterface};

/// Captures UI interactions.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    data: Vec<String>,
    headers: Vec<String>,
    confirms_asked: Vec<String>,
    confirm_answers: VecDeque<bool>,
    spinners: Arc<Mutex<Vec<String>>>,
}

impl MockUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// Answers returned by successive `confirm` calls. Once exhausted,
    /// the question's default is used.
    pub fn queue_confirms(&mut self, answers: impl IntoIterator<Item = bool>) {
        self.confirm_answers.extend(answers);
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Everything written through `data`.
    pub fn data_lines(&self) -> &[String] {
        &self.data
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn confirms_asked(&self) -> &[String] {
        &self.confirms_asked
    }

    /// Spinner start and finish messages, in order.
    pub fn spinner_events(&self) -> Vec<String> {
        self.spinners.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Whether any captured text contains `needle`.
    pub fn has_output(&self, needle: &str) -> bool {
        self.messages
            .iter()
            .chain(&self.successes)
            .chain(&self.warnings)
            .chain(&self.errors)
            .chain(&self.data)
            .any(|line| line.contains(needle))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn data(&mut self, text: &str) {
        self.data.push(text.to_string());
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn confirm(&mut self, question: &str, default: bool) -> Result<bool> {
        self.confirms_asked.push(question.to_string());
        Ok(self.confirm_answers.pop_front().unwrap_or(default))
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if let Ok(mut events) = self.spinners.lock() {
            events.push(format!("start: {}", message));
        }
        Box::new(MockSpinner {
            events: Arc::clone(&self.spinners),
        })
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Spinner that records into its parent [`MockUI`].
#[derive(Debug)]
pub struct MockSpinner {
    events: Arc<Mutex<Vec<String>>>,
}

impl MockSpinner {
    fn record(&self, event: String) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl SpinnerHandle for MockSpinner {
    fn finish_success(&mut self, msg: &str) {
        self.record(format!("success: {}", msg));
    }

    fn finish_error(&mut self, msg: &str) {
        self.record(format!("error: {}", msg));
    }
}
