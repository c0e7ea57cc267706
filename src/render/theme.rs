//! Visual theme and styling.

use console::Style;

/// Cairn's visual theme.
#[derive(Debug, Clone)]
pub struct CairnTheme {
    /// Style for completed glyphs (green).
    pub success: Style,
    /// Style for failed glyphs (red bold).
    pub error: Style,
    /// Style for the running spinner glyph (magenta).
    pub info: Style,
    /// Style for pending/skipped glyphs and secondary text.
    pub dim: Style,
    /// Style for durations (dim).
    pub duration: Style,
}

impl Default for CairnTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl CairnTheme {
    /// Create the default theme.
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            error: Style::new().red().bold(),
            info: Style::new().magenta(),
            dim: Style::new().dim(),
            duration: Style::new().dim(),
        }
    }

    /// Create a theme without colors (for non-TTY or --no-color).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            error: Style::new(),
            info: Style::new(),
            dim: Style::new(),
            duration: Style::new(),
        }
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // Check NO_COLOR env var (https://no-color.org/)
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stderr().is_term()
}
