//! Terminal output utilities
//!
//! Provides consistent formatting for CLI output. Colors follow the
//! terminal's capabilities and `owo_colors::set_override`.

use owo_colors::{OwoColorize, Stream};
use releasekit_core::error::Error;
use serde::Serialize;

/// Status message helpers
pub struct Status;

impl Status {
    /// Print a success message
    pub fn success(message: &str) {
        println!(
            "{} {}",
            "✓".if_supports_color(Stream::Stdout, |t| t.green()),
            message
        );
    }

    /// Print an error message
    pub fn error(message: &str) {
        eprintln!(
            "{} {}",
            "✗".if_supports_color(Stream::Stderr, |t| t.red()),
            message
        );
    }

    /// Print a warning message
    pub fn warning(message: &str) {
        eprintln!(
            "{} {}",
            "⚠".if_supports_color(Stream::Stderr, |t| t.yellow()),
            message
        );
    }

    /// Print an info message
    pub fn info(message: &str) {
        println!(
            "{} {}",
            "ℹ".if_supports_color(Stream::Stdout, |t| t.blue()),
            message
        );
    }

    /// Print a header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.if_supports_color(Stream::Stdout, |t| t.bold()));
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Value shown when a field is absent
pub const UNSET: &str = "<unset>";

/// Format `label: value` rows with the values aligned in one column
pub fn format_fields(fields: &[(&str, Option<String>)]) -> Vec<String> {
    let width = fields
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);

    fields
        .iter()
        .map(|(label, value)| {
            format!(
                "  {:<width$}  {}",
                format!("{}:", label),
                value.as_deref().unwrap_or(UNSET),
                width = width + 1
            )
        })
        .collect()
}

/// Print aligned `label: value` rows
pub fn print_fields(fields: &[(&str, Option<String>)]) {
    for line in format_fields(fields) {
        println!("{}", line);
    }
}

/// Print a value as pretty JSON on stdout
pub fn print_json<T: Serialize>(value: &T) -> serde_json::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print an error with its code, context and suggestion
pub fn print_error(err: &Error) {
    Status::error(&format!(
        "{} {}",
        err.code.if_supports_color(Stream::Stderr, |t| t.dimmed()),
        err.message
    ));
    if let Some(context) = &err.context {
        eprintln!(
            "  {} {}",
            "context:".if_supports_color(Stream::Stderr, |t| t.dimmed()),
            context
        );
    }
    if let Some(suggestion) = &err.suggestion {
        eprintln!(
            "  {} {}",
            "hint:".if_supports_color(Stream::Stderr, |t| t.cyan()),
            suggestion
        );
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_fields_aligned() {
        let lines = format_fields(&[
            ("storeFile", Some("app.jks".to_string())),
            ("keyAlias", None),
        ]);
        assert_eq!(lines[0], "  storeFile:  app.jks");
        assert_eq!(lines[1], "  keyAlias:   <unset>");
    }

    #[test]
    fn test_format_fields_empty() {
        assert!(format_fields(&[]).is_empty());
    }

    #[test]
    fn test_format_count_singular() {
        assert_eq!(format_count(1, "key", "keys"), "1 key");
    }

    #[test]
    fn test_format_count_plural() {
        assert_eq!(format_count(3, "key", "keys"), "3 keys");
    }
}
