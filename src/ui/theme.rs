//! Visual theme and styling.

use console::Style;

/// Terminal styles.
#[derive(Debug, Clone)]
pub struct CardsyncTheme {
    /// Success messages (green).
    pub success: Style,
    /// Warning messages (orange).
    pub warning: Style,
    /// Error messages (red bold).
    pub error: Style,
    /// Headers (magenta bold).
    pub header: Style,
}

impl Default for CardsyncTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl CardsyncTheme {
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            header: Style::new().bold().magenta(),
        }
    }

    /// Theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            header: Style::new(),
        }
    }

    /// Colored theme unless colors are disabled.
    pub fn for_terminal() -> Self {
        if should_use_colors() {
            Self::new()
        } else {
            Self::plain()
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        self.success.apply_to(format!("✓ {}", msg)).to_string()
    }

    pub fn format_warning(&self, msg: &str) -> String {
        self.warning.apply_to(format!("⚠ {}", msg)).to_string()
    }

    pub fn format_error(&self, msg: &str) -> String {
        self.error.apply_to(format!("✗ {}", msg)).to_string()
    }

    pub fn format_header(&self, title: &str) -> String {
        self.header.apply_to(title).to_string()
    }
}

/// Whether colored output should be used.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    console::colors_enabled()
}
