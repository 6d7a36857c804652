//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::Colorize;

use crate::domain::{CapacityReport, FlatUnit};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

/// Print success status (green checkmark)
pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// Print labelled value (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

/// Print section header (cyan bold)
pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print plain output (no color, for data/JSON)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// Indented entry of a flat listing: two spaces per level below the root.
pub fn unit_line(entry: &FlatUnit) {
    let indent = "  ".repeat(entry.depth.saturating_sub(1));
    println!(
        "{}{} {} {}",
        indent,
        entry.unit.name,
        format!("[fte {}]", entry.unit.fte).dimmed(),
        entry.unit.id.to_string().dimmed()
    );
}

/// Capacity allocation of one unit; red headroom when fully allocated.
pub fn capacity(report: &CapacityReport) {
    println!("  fte:             {}", report.fte);
    println!("  direct children: {}", report.direct_children);
    println!("  whole subtree:   {}", report.transitive);
    let headroom = report.headroom.to_string();
    if report.headroom == 0 {
        println!("  headroom:        {}", headroom.red());
    } else {
        println!("  headroom:        {}", headroom.green());
    }
}
