//! Terminal styling for CLI output.
//!
//! Styles are only applied when stdout supports colour, so piped output
//! stays plain text.

use owo_colors::{colors::css, OwoColorize};

/// Detects whether colored output should be enabled.
fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Semantic styles for the messages the CLI prints.
pub trait Colorize {
    /// Confirmation of a completed change (green).
    fn success(&self) -> String;
    /// A failure shown to the user (red).
    fn error(&self) -> String;
    /// Title above a run of prompts.
    fn heading(&self) -> String;
    /// Secondary context such as the active filter.
    fn dim(&self) -> String;
}

impl<T: AsRef<str> + ?Sized> Colorize for T {
    fn success(&self) -> String {
        paint(self.as_ref(), supports_color(), |s| s.fg::<css::Green>().to_string())
    }

    fn error(&self) -> String {
        paint(self.as_ref(), supports_color(), |s| s.fg::<css::Crimson>().to_string())
    }

    fn heading(&self) -> String {
        paint(self.as_ref(), supports_color(), |s| s.bold().to_string())
    }

    fn dim(&self) -> String {
        paint(self.as_ref(), supports_color(), |s| s.dimmed().to_string())
    }
}

fn paint(text: &str, enabled: bool, style: impl FnOnce(&str) -> String) -> String {
    if enabled {
        style(text)
    } else {
        text.to_string()
    }
}
