//! Output formatting utilities.

use colored::Colorize;
use md_schema::ValidationError;
use serde::Serialize;

use crate::config::OutputFormat;

/// Prints a success message.
pub fn success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Prints an error message.
pub fn error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Prints a warning message.
pub fn warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), message);
}

/// Prints an info message.
pub fn info(message: &str) {
    eprintln!("{} {}", "ℹ".blue().bold(), message);
}

/// Outputs a single item. Text mode prints JSON too; structured documents
/// have no better plain rendering.
pub fn output_single<T: Serialize>(item: &T, format: OutputFormat) -> crate::CliResult<()> {
    match format {
        OutputFormat::Text | OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(item)?);
        }
        OutputFormat::Quiet => {}
    }
    Ok(())
}

/// Prints every violation of a failed validation.
pub fn violations(err: &ValidationError) {
    error(&format!(
        "{} violation(s) of the {} schema ({})",
        err.messages.len(),
        err.entity_type,
        err.schema_path.display()
    ));
    for message in &err.messages {
        eprintln!("  {} {}", "-".red(), message);
    }
}
