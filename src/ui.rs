//! Centralized UI formatting and color utilities
//!
//! Verdict icons and colours used by the dimcheck CLI.

use colored::{ColoredString, Colorize};

use crate::evaluate::Verdict;

/// Check if quiet mode is enabled via environment variable or --quiet flag
pub fn is_quiet() -> bool {
    std::env::var("DIMCHECK_QUIET")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Returns a colored icon for the given verdict.
///
/// Icons:
/// - Conforming: ✔ (green)
/// - NonConforming: ✘ (red)
/// - Undetermined: ? (yellow)
pub fn verdict_icon(verdict: Verdict) -> ColoredString {
    match verdict {
        Verdict::Conforming => "✔".green(),
        Verdict::NonConforming => "✘".red(),
        Verdict::Undetermined => "?".yellow(),
    }
}

/// Colour `text` the way its verdict is shown.
pub fn verdict_colored(text: &str, verdict: Verdict) -> ColoredString {
    match verdict {
        Verdict::Conforming => text.green(),
        Verdict::NonConforming => text.red().bold(),
        Verdict::Undetermined => text.yellow(),
    }
}

/// Color scheme for status-related text output
pub mod colors {
    use colored::{ColoredString, Colorize};

    /// Dimmed for secondary text
    pub fn secondary(text: &str) -> ColoredString {
        text.dimmed()
    }

    /// Bold for headings
    pub fn heading(text: &str) -> ColoredString {
        text.bold()
    }
}

/// Common text formatting patterns
pub mod format {
    /// Truncate text to `max_len` characters, ending with `...` when cut
    pub fn truncate(text: &str, max_len: usize) -> String {
        if text.chars().count() <= max_len {
            text.to_string()
        } else {
            let kept: String = text.chars().take(max_len.saturating_sub(3)).collect();
            format!("{}...", kept)
        }
    }

    /// Left-align `text` in a field of `width` characters
    pub fn pad(text: &str, width: usize) -> String {
        let len = text.chars().count();
        format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
    }

    /// Right-align `text` in a field of `width` characters
    pub fn pad_left(text: &str, width: usize) -> String {
        let len = text.chars().count();
        format!("{}{}", " ".repeat(width.saturating_sub(len)), text)
    }

    /// Format a separator line for sections
    pub fn separator(width: usize) -> String {
        "─".repeat(width)
    }
}
