//! Unified output formatting utilities for consistent console presentation.
//!
//! # Design Principles
//! - **Consistent color scheme**: Red for errors, yellow for prompts, green for
//!   completed actions, blue for commands, bright_black for descriptions
//! - **Short lines**: Session feedback is one line per event so a busy counter
//!   stays readable

use colored::*;

/// Formats and prints an error message with consistent styling
///
/// # Format
/// ```text
///
/// ✕ Error: <message>
///
/// ```
pub fn print_error(message: &str) {
    println!("\n{} {}\n", "✕ Error:".red(), message.white());
}

/// Formats and prints a command table, used by `help`
///
/// # Format
/// ```text
///
/// <title>:
///   <command>  <description>
///   ...
///
/// ```
pub fn print_usage(title: &str, commands: &[(&str, &str)]) {
    println!("\n{}", format!("{title}:").blue());

    let width = commands
        .iter()
        .map(|(command, _)| command.chars().count())
        .max()
        .unwrap_or(0);
    for (command, description) in commands {
        let padding = width - command.chars().count();
        println!(
            "  {}{}  {}",
            command.white(),
            " ".repeat(padding),
            description.bright_black()
        );
    }

    println!();
}

/// Formats and prints a success message
///
/// # Format
/// ```text
/// ✓ <message>
/// ```
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green(), message.white());
}

/// Formats and prints a warning that asks the operator to act
///
/// # Format
/// ```text
/// ! <message>
/// ```
pub fn print_warning(message: &str) {
    println!("{} {}", "!".yellow(), message.yellow());
}

/// Formats and prints an informational message
pub fn print_info(message: &str) {
    println!("{}", message.white());
}

/// Formats and prints a section header with consistent styling
///
/// # Format
/// ```text
///
/// <header>:
///
/// ```
pub fn print_section_header(header: &str) {
    println!("\n{}:\n", header.white());
}
