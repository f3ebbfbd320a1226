//! Terminal user interface.
//!
//! - [`UserInterface`] trait so commands can run against a [`MockUI`]
//! - [`TerminalUI`] for interactive terminals
//! - [`NonInteractiveUI`] for pipes and CI
//!
//! # Example
//!
//! ```
//! use cardsync::ui::{create_ui, OutputMode};
//!
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.success("Symbols up to date");
//! ```

pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod prompts;
pub mod spinner;
pub mod table;
pub mod terminal;
pub mod theme;

pub use mock::{MockSpinner, MockUI};
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use spinner::ProgressSpinner;
pub use table::Table;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, CardsyncTheme};

use crate::error::Result;

/// User interaction surface consumed by commands.
pub trait UserInterface {
    fn output_mode(&self) -> OutputMode;

    /// Status line, hidden in silent mode.
    fn message(&mut self, msg: &str);

    fn success(&mut self, msg: &str);

    fn warning(&mut self, msg: &str);

    /// Always shown.
    fn error(&mut self, msg: &str);

    /// Command output (tables, JSON) that must reach stdout in every mode.
    fn data(&mut self, text: &str);

    /// Show a header line.
    fn show_header(&mut self, title: &str);

    /// Ask a yes/no question.
    fn confirm(&mut self, question: &str, default: bool) -> Result<bool>;

    /// Start a spinner for a long operation.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;

    fn is_interactive(&self) -> bool;
}

/// Handle for controlling a spinner.
pub trait SpinnerHandle {
    fn finish_success(&mut self, msg: &str);

    fn finish_error(&mut self, msg: &str);
}
