//! Terminal output formatting with colors
//!
//! Respects NO_COLOR, CLICOLOR, CLICOLOR_FORCE automatically.

use colored::{ColoredString, Colorize};

use crate::domain::{CascadeFailure, Node};

/// Print error (red bold "error:" prefix) to stderr
pub fn error(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// Print warning (yellow "Warning:" prefix) to stderr
pub fn warning(msg: &(impl std::fmt::Display + ?Sized)) {
    eprintln!("{}: {}", "Warning".yellow(), msg);
}

pub fn success(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// One failed node of a cascade. Vanished nodes are marked `?`, refused
/// writes `✗`.
pub fn failure(failure: &CascadeFailure) {
    let mark = if failure.not_found {
        "?".yellow()
    } else {
        "✗".red()
    };
    println!("  {} {}: {}", mark, failure.node_id, failure.reason);
}

/// Print completed action (green label)
pub fn action(label: &str, msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}: {}", label.green(), msg);
}

pub fn header(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg.to_string().cyan().bold());
}

/// Print indented detail (no color)
pub fn detail(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("  {}", msg);
}

/// Print plain output (no color, for ids and data)
pub fn info(msg: &(impl std::fmt::Display + ?Sized)) {
    println!("{}", msg);
}

/// `on` in green, `off` in red.
pub fn state(on: bool) -> ColoredString {
    if on {
        "on".green()
    } else {
        "off".red()
    }
}

/// Tree label: `id [on]`
pub fn node_label(node: &Node) -> String {
    format!("{} [{}]", node.id, state(node.state))
}
