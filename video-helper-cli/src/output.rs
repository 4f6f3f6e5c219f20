//! Human-readable command output on stdout.

use owo_colors::OwoColorize;
use std::fmt::Display;
use std::io::IsTerminal;

/// Color is used on a terminal unless NO_COLOR is set.
pub fn should_use_color() -> bool {
    std::env::var_os("NO_COLOR").is_none() && std::io::stdout().is_terminal()
}

/// Print a section heading
pub fn print_heading(text: &str) {
    if should_use_color() {
        println!("{}", text.cyan().bold());
    } else {
        println!("{text}");
    }
}

/// Print an aligned label/value line
pub fn print_info<T: Display>(label: &str, value: T) {
    let label = format!("{label}:");
    if should_use_color() {
        println!("  {:<12} {}", label.bold(), value);
    } else {
        println!("  {label:<12} {value}");
    }
}

/// Print a success line
pub fn print_success(message: &str) {
    if should_use_color() {
        println!("{} {}", "✓".green().bold(), message);
    } else {
        println!("✓ {message}");
    }
}

/// Print a failure line (on stdout; errors proper go to stderr)
pub fn print_failure(message: &str) {
    if should_use_color() {
        println!("{} {}", "✗".bright_red().bold(), message);
    } else {
        println!("✗ {message}");
    }
}
