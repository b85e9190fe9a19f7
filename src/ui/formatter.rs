//! Pure formatting functions for UI output.
//!
//! This module contains all display/formatting logic separated from the
//! logger's sinks. Functions here return strings and are testable.

use console::style;

use crate::boundary::BoundaryWarning;
use crate::ui::Level;

/// Format a log line for the given level.
///
/// Debug lines are dimmed, warnings yellow, errors red and successes carry a
/// green checkmark. Info lines are printed as-is behind an arrow.
pub fn format_line(level: Level, message: &str) -> String {
    match level {
        Level::Debug => format!("{} {}", style("·").dim(), style(message).dim()),
        Level::Info => format!("{} {}", style("→").yellow(), message),
        Level::Warn => format!("{} {}", style("⚠ WARNING:").yellow(), message),
        Level::Error => format!("{} {}", style("ERROR:").red(), message),
        Level::Success => format!("{} {}", style("✓").green(), message),
    }
}

/// Format a boundary warning for display.
pub fn format_boundary_warning(warning: &BoundaryWarning) -> String {
    warning.to_string()
}

/// Format the version transition line.
///
/// # Arguments
/// * `from` - Version currently in the manifest
/// * `to` - Version the run produces
pub fn format_transition(from: &str, to: &str) -> String {
    format!("{} → {}", style(from).red(), style(to).green())
}

/// Prefix a message with a dry-run marker.
pub fn format_dry_run(message: &str) -> String {
    format!("{} {}", style("[dry-run]").cyan(), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(s: String) -> String {
        console::strip_ansi_codes(&s).into_owned()
    }

    #[test]
    fn test_format_line_levels() {
        assert_eq!(plain(format_line(Level::Error, "boom")), "ERROR: boom");
        assert_eq!(plain(format_line(Level::Success, "done")), "✓ done");
        assert_eq!(plain(format_line(Level::Info, "step")), "→ step");
        assert_eq!(plain(format_line(Level::Warn, "careful")), "⚠ WARNING: careful");
    }

    #[test]
    fn test_format_transition() {
        assert_eq!(plain(format_transition("1.4.2", "1.5.0")), "1.4.2 → 1.5.0");
    }

    #[test]
    fn test_format_dry_run() {
        assert_eq!(
            plain(format_dry_run("git tag 1.0.0")),
            "[dry-run] git tag 1.0.0"
        );
    }
}
