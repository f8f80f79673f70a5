//! Plain-text CLI output formatting (AMBIENT.4).

use std::fmt::Display;

/// Print a section header.
pub fn section(title: &str) {
    println!();
    println!("{title}");
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    println!("  {label:<14} {value}");
}

/// Print a success line.
pub fn success(message: &str) {
    println!("  [ok]   {message}");
}

/// Print a warning line.
pub fn warning(message: &str) {
    println!("  [warn] {message}");
}
