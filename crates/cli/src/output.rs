//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output. Colors follow terminal
//! support unless forced off with [`set_color`].

use droidcfg_core::validation::ValidationIssue;
use owo_colors::{OwoColorize, Stream};

/// Force colors off (`false`) or back to terminal detection (`true`)
pub fn set_color(enabled: bool) {
    if enabled {
        owo_colors::unset_override();
    } else {
        owo_colors::set_override(false);
    }
}

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!(
            "{} {}",
            "✓".if_supports_color(Stream::Stdout, |s| s.green()),
            message
        );
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!(
            "{} {}",
            "✗".if_supports_color(Stream::Stderr, |s| s.red()),
            message
        );
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!(
            "{} {}",
            "⚠".if_supports_color(Stream::Stderr, |s| s.yellow()),
            message
        );
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.if_supports_color(Stream::Stdout, |s| s.bold()));
        println!("{}", "─".repeat(message.chars().count()));
    }

    /// Print one validation issue as an error
    pub fn issue_error(issue: &ValidationIssue) {
        Self::error(&format_issue(issue));
    }

    /// Print one validation issue as a warning
    pub fn issue_warning(issue: &ValidationIssue) {
        Self::warning(&format_issue(issue));
    }

    /// Print aligned `key  value` rows
    pub fn table(rows: &[(String, String)]) {
        for line in format_table(rows) {
            println!("  {}", line);
        }
    }
}

/// `field: message [CODE] (expected X, got Y)`
pub fn format_issue(issue: &ValidationIssue) -> String {
    let mut line = format!("{}: {} [{}]", issue.field, issue.message, issue.code);
    match (&issue.expected, &issue.actual) {
        (Some(expected), Some(actual)) => {
            line.push_str(&format!(" (expected {}, got {})", expected, actual));
        }
        (Some(expected), None) => line.push_str(&format!(" (expected {})", expected)),
        _ => {}
    }
    line
}

/// Pad keys so values line up
pub fn format_table(rows: &[(String, String)]) -> Vec<String> {
    let width = rows.iter().map(|(k, _)| k.chars().count()).max().unwrap_or(0);
    rows.iter()
        .map(|(key, value)| format!("{:<width$}  {}", key, value, width = width))
        .collect()
}

/// Format a duration for display
pub fn format_duration(duration: std::time::Duration) -> String {
    let secs = duration.as_secs_f32();
    if secs < 1.0 {
        format!("{:.0}ms", secs * 1000.0)
    } else {
        format!("{:.1}s", secs)
    }
}

/// Format a count with singular/plural
pub fn format_count(count: usize, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{} {}", count, singular)
    } else {
        format!("{} {}", count, plural)
    }
}
