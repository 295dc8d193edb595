//! Shared CLI output helpers.
//!
//! Color scheme (`console` honors NO_COLOR and non-tty output):
//! - Green: success
//! - Red: errors
//! - Cyan: paths, keys, hints
//! - Bold: important values
//! - Dim: secondary info

use std::fmt::Display;

use console::style;

const RULE_WIDTH: usize = 56;

/// Example: `✓ initialized`
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green(), msg);
}

/// Print an error message to stderr.
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red(), msg);
}

/// Example: `→ run: mooring secrets init`
pub fn hint(msg: &str) {
    eprintln!("{} {}", style("→").cyan(), style(msg).cyan());
}

/// Print a key-value pair (label dimmed, value bold).
pub fn kv(label: &str, value: impl Display) {
    println!("  {:<12} {}", style(label).dim(), style(value).bold());
}

pub fn list_item(item: &str) {
    println!("  • {}", item);
}

pub fn dimmed(msg: &str) {
    println!("{}", style(msg).dim());
}

/// Format a path for inline use.
pub fn path(p: impl Display) -> String {
    style(p).cyan().to_string()
}

/// Format a key name for inline use.
pub fn key(k: &str) -> String {
    style(k).cyan().to_string()
}

/// Print a section header with a separator line.
pub fn section(title: &str) {
    println!();
    header(title);
    rule();
}

/// Print a bold section header.
fn header(title: &str) {
    println!("{}", style(title).bold());
}

/// Print a horizontal rule separator.
fn rule() {
    println!("{}", style("─".repeat(RULE_WIDTH)).dim());
}
