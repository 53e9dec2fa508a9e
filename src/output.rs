//! Output formatting and styling module.
//!
//! Provides a centralized interface for all console output, including colored
//! messages, the scan spinner and the session status line.

use crate::controller::{BrowsingController, SessionState};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use rand::Rng;
use std::time::Duration;

/// Manages all console output with consistent styling and formatting.
///
/// - Success messages (green with ✓)
/// - Error messages (red with ✗)
/// - Warning messages (yellow with ⚠)
/// - Info messages (cyan)
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// ```no_run
    /// use picsort::output::OutputFormatter;
    /// OutputFormatter::success("Moved to cats/");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark.
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    pub fn plain(message: &str) {
        println!("{}", message);
    }

    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Creates a spinner shown while a folder is being scanned.
    pub fn scan_spinner(folder: &str) -> ProgressBar {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Scanning {folder}"));
        pb.enable_steady_tick(Duration::from_millis(80));
        pb
    }

    /// Prints the current image and its position, or why there is none.
    pub fn status<R: Rng>(session: &BrowsingController<R>) {
        match (session.state(), session.current_item(), session.position()) {
            (SessionState::Browsing, Some(item), Some(position)) => {
                let name = item
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .unwrap_or_else(|| item.display().to_string());
                println!(
                    "{} {} {}",
                    format!("[{}/{}]", position.index + 1, position.total).bold(),
                    name.green(),
                    format!("({})", item.display()).dimmed()
                );
            }
            _ if session.base_folder().is_none() => {
                Self::info("No folder open. Use 'open <path>'.");
            }
            _ => Self::info("No images to show."),
        }
    }

    /// Prints the known categories as a numbered list.
    pub fn categories(names: &[String]) {
        if names.is_empty() {
            Self::info("No categories yet. Use 'add <name>'.");
            return;
        }
        Self::header("CATEGORIES");
        for (i, name) in names.iter().enumerate() {
            println!("  {:>2}. {}", i + 1, name);
        }
    }
}
