//! Terminal output for the `linebook` commands.
//!
//! Human-readable only; commands that support `--json` serialize their
//! report directly instead of going through these helpers.

use std::fmt::Display;

use owo_colors::OwoColorize;

use crate::domain::SelectionRecord;

/// Print the binary name and version.
pub fn header(version: &str) {
    println!("{} {}", "linebook".bold(), version.dimmed());
}

/// Print a section header.
pub fn section(title: &str) {
    println!();
    println!("{}", title.bold());
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    println!("  {:<12} {}", label.dimmed(), value);
}

/// Print a decimal price next to its signed form, e.g. `1.9091  (-110)`.
pub fn price(label: &str, decimal: f64, signed: &str) {
    println!(
        "  {:<12} {:.4}  {}",
        label.dimmed(),
        decimal,
        format!("({signed})").cyan()
    );
}

/// Print one indexed selection: settlement id, odds and label.
pub fn selection_row(record: &SelectionRecord) {
    let odds = record
        .odds
        .map_or_else(|| "-".to_string(), |o| format!("{o:.3}"));
    println!(
        "  {:<24} {:>8}  {}",
        record.external_id.as_str().cyan(),
        odds,
        record.label()
    );
}

pub fn ok(message: &str) {
    println!("  {} {}", "✓".green(), message);
}

pub fn warn(message: &str) {
    println!("  {} {}", "⚠".yellow(), message);
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    eprintln!("  {} {}", "×".red(), message);
}

/// Print a dimmed follow-up line under an error, such as a venue hint.
pub fn hint(message: &str) {
    eprintln!("    {}", message.dimmed());
}
