//! Consolidated styling module for terminal output.
//!
//! This module uses the anstyle ecosystem:
//! - anstream for auto-detecting color support
//! - anstyle for composable styling
//! - Semantic style constants for messages, plus per-stage colours for timelines

use anstyle::{AnsiColor, Color, Style};

// ============================================================================
// Re-exports from anstream (auto-detecting output)
// ============================================================================

/// Auto-detecting println that respects NO_COLOR, CLICOLOR_FORCE, and terminal capabilities
pub use anstream::println;

/// Auto-detecting print that respects NO_COLOR, CLICOLOR_FORCE, and terminal capabilities
pub use anstream::print;

/// Auto-detecting eprintln that respects NO_COLOR, CLICOLOR_FORCE, and terminal capabilities
pub use anstream::eprintln;

// ============================================================================
// Semantic Style Constants
// ============================================================================

/// Error style (red) - use as `{ERROR}text{ERROR:#}`
pub const ERROR: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Red)));

/// Warning style (yellow) - use as `{WARNING}text{WARNING:#}`
pub const WARNING: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Yellow)));

/// Hint style (dimmed) - use as `{HINT}text{HINT:#}`
pub const HINT: Style = Style::new().dimmed();

/// Success style (green)
pub const SUCCESS: Style = Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green)));

/// Background for stage segments in timelines
pub const TIMELINE_BG: Style = Style::new().bg_color(Some(Color::Ansi(AnsiColor::Black)));

/// Total segment at the end of a timeline (black on white)
pub const TIMELINE_TOTAL: Style = Style::new()
    .fg_color(Some(Color::Ansi(AnsiColor::Black)))
    .bg_color(Some(Color::Ansi(AnsiColor::White)));

// ============================================================================
// Message Emojis
// ============================================================================

/// Error emoji - use with ERROR style: `eprintln!("{ERROR_EMOJI} {ERROR}message{ERROR:#}");`
pub const ERROR_EMOJI: &str = "❌";

/// Warning emoji - use with WARNING style: `eprintln!("{WARNING_EMOJI} {WARNING}message{WARNING:#}");`
pub const WARNING_EMOJI: &str = "🟡";

/// Hint emoji - use with HINT style: `println!("{HINT_EMOJI} {HINT}message{HINT:#}");`
pub const HINT_EMOJI: &str = "💡";

/// Success emoji
pub const SUCCESS_EMOJI: &str = "✅";

// ============================================================================
// Stage colours
// ============================================================================

/// Map a configured colour name to an ANSI colour.
///
/// Accepts the basic eight names plus their `bright-` (or `light`) variants;
/// anything else renders unstyled.
pub fn parse_color(name: &str) -> Option<AnsiColor> {
    let name = name.trim().to_ascii_lowercase().replace('_', "-");
    let (bright, base) = match name
        .strip_prefix("bright-")
        .or_else(|| name.strip_prefix("light"))
    {
        Some(rest) => (true, rest.trim_start_matches('-')),
        None => (false, name.as_str()),
    };

    let color = match (base, bright) {
        ("black", false) => AnsiColor::Black,
        ("red", false) => AnsiColor::Red,
        ("green", false) => AnsiColor::Green,
        ("yellow", false) => AnsiColor::Yellow,
        ("blue", false) => AnsiColor::Blue,
        ("magenta", false) => AnsiColor::Magenta,
        ("cyan", false) => AnsiColor::Cyan,
        ("white", false) => AnsiColor::White,
        ("black", true) | ("grey", false) | ("gray", false) => AnsiColor::BrightBlack,
        ("red", true) => AnsiColor::BrightRed,
        ("green", true) => AnsiColor::BrightGreen,
        ("yellow", true) => AnsiColor::BrightYellow,
        ("blue", true) => AnsiColor::BrightBlue,
        ("magenta", true) => AnsiColor::BrightMagenta,
        ("cyan", true) => AnsiColor::BrightCyan,
        ("white", true) => AnsiColor::BrightWhite,
        _ => return None,
    };
    Some(color)
}

/// Timeline style for a stage: its colour over the timeline background.
pub fn stage_style(color_name: &str) -> Style {
    TIMELINE_BG.fg_color(parse_color(color_name).map(Color::Ansi))
}

// ============================================================================
// Styled Output Types
// ============================================================================

/// A piece of text with an optional style
#[derive(Clone, Debug)]
pub struct StyledString {
    pub text: String,
    pub style: Option<Style>,
}

impl StyledString {
    pub fn new(text: impl Into<String>, style: Option<Style>) -> Self {
        Self {
            text: text.into(),
            style,
        }
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self::new(text, None)
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self::new(text, Some(style))
    }

    /// Renders to a string with ANSI escape codes
    pub fn render(&self) -> String {
        if let Some(style) = &self.style {
            format!("{}{}{}", style.render(), self.text, style.render_reset())
        } else {
            self.text.clone()
        }
    }
}

/// A line composed of multiple styled strings
#[derive(Clone, Debug, Default)]
pub struct StyledLine {
    pub segments: Vec<StyledString>,
}

impl StyledLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a raw (unstyled) segment
    pub fn push_raw(&mut self, text: impl Into<String>) {
        self.segments.push(StyledString::raw(text));
    }

    /// Add a styled segment
    pub fn push_styled(&mut self, text: impl Into<String>, style: Style) {
        self.segments.push(StyledString::styled(text, style));
    }

    /// Text without any escape codes
    pub fn plain(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// Renders the entire line with ANSI escape codes
    pub fn render(&self) -> String {
        self.segments.iter().map(|s| s.render()).collect()
    }
}
