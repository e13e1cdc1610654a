//! Colored console printers

use crate::output::event::{Outcome, ScanEvent};
use colored::Colorize;

pub fn print_banner(version: &str) {
    println!("{}", "=".repeat(60).dimmed());
    println!("{} v{}", "vhunter".bold(), version);
    println!("{}", "=".repeat(60).dimmed());
}

pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".cyan(), msg);
}

pub fn print_warning(msg: &str) {
    eprintln!("{} {}", "[!]".yellow().bold(), msg.yellow());
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[!]".red().bold(), msg.red());
}

/// Colored rendering of a result line.
pub fn render_event(event: &ScanEvent) -> String {
    let marker = match event.outcome {
        Outcome::Found { .. } => event.marker().green().bold(),
        Outcome::Suppressed { .. } => event.marker().yellow(),
        Outcome::Indistinct { .. } => event.marker().dimmed(),
        Outcome::ProbeFailed { .. } | Outcome::BaselineFailed { .. } => event.marker().red().bold(),
    };
    let detail = match event.outcome {
        Outcome::Found { .. } => event.detail().green().to_string(),
        Outcome::Indistinct { .. } => event.detail().dimmed().to_string(),
        _ => event.detail(),
    };
    format!("{} {}", marker, detail)
}
