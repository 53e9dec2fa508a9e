//! Interactive console front end.
//!
//! This module turns lines typed at the prompt into controller calls and
//! prints their results:
//! - Command parsing (clap in multicall mode, one command per line)
//! - Dispatch to the [`BrowsingController`]
//! - User-facing messages through [`OutputFormatter`]

use crate::controller::{BrowsingController, Navigation, OpenOutcome};
use crate::error::SortError;
use crate::order::OrderMode;
use crate::output::OutputFormatter;
use chrono::Local;
use clap::{Parser, Subcommand};
use rand::Rng;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// One line typed at the prompt.
#[derive(Debug, Parser)]
#[command(multicall = true)]
pub struct ConsoleLine {
    #[command(subcommand)]
    pub command: ConsoleCommand,
}

/// Commands understood by the prompt.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum ConsoleCommand {
    /// Open a folder and scan it for images
    #[command(visible_alias = "o")]
    Open {
        #[arg(allow_hyphen_values = true)]
        path: String,
    },
    /// Show the next image
    #[command(visible_alias = "n")]
    Next,
    /// Show the previous image
    #[command(visible_alias = "p")]
    Prev,
    /// Switch between sequential and shuffled order
    Order {
        #[arg(value_enum)]
        mode: OrderMode,
    },
    /// Create a new category folder
    #[command(visible_alias = "a")]
    Add {
        #[arg(allow_hyphen_values = true)]
        name: String,
    },
    /// Move the current image into a category
    #[command(visible_alias = "m")]
    Move {
        #[arg(allow_hyphen_values = true)]
        category: String,
    },
    /// Revert the last move
    #[command(visible_alias = "u")]
    Undo,
    /// Show the current image
    #[command(visible_alias = "s")]
    Status,
    /// List the categories
    #[command(visible_alias = "ls")]
    Categories,
    /// Leave the program
    #[command(visible_alias = "q", alias = "exit")]
    Quit,
}

/// Whether the prompt should keep reading after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Commands whose argument is the rest of the line, spaces included.
const FREE_TEXT_COMMANDS: &[&str] = &["open", "o", "add", "a", "move", "m"];

/// Parses one input line. Returns `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<ConsoleCommand>, clap::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (name, rest) = match line.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = if FREE_TEXT_COMMANDS.contains(&name) {
        std::iter::once(name)
            .chain((!rest.is_empty()).then_some(rest))
            .collect()
    } else {
        line.split_whitespace().collect()
    };
    ConsoleLine::try_parse_from(args).map(|parsed| Some(parsed.command))
}

/// Runs the prompt until `quit` or end of input.
pub fn run_console<R: Rng>(
    session: &mut BrowsingController<R>,
    input: impl BufRead,
) -> io::Result<()> {
    prompt()?;
    for line in input.lines() {
        let line = line?;
        match parse_line(&line) {
            Ok(Some(command)) => {
                if execute(session, command) == Flow::Quit {
                    return Ok(());
                }
            }
            Ok(None) => {}
            Err(e) => OutputFormatter::plain(e.to_string().trim_end()),
        }
        prompt()?;
    }
    Ok(())
}

fn prompt() -> io::Result<()> {
    print!("picsort> ");
    io::stdout().flush()
}

/// Executes one command against the session and reports the outcome.
pub fn execute<R: Rng>(session: &mut BrowsingController<R>, command: ConsoleCommand) -> Flow {
    match command {
        ConsoleCommand::Open { path } => open_folder(session, Path::new(&path)),
        ConsoleCommand::Next => navigate(session.next(), session),
        ConsoleCommand::Prev => navigate(session.previous(), session),
        ConsoleCommand::Order { mode } => {
            session.set_order_mode(mode);
            OutputFormatter::success(&format!("Browsing in {} order", mode));
            OutputFormatter::status(session);
        }
        ConsoleCommand::Add { name } => match session.add_category(&name) {
            Ok(()) => OutputFormatter::success(&format!("Added category {}", name)),
            Err(e) => report(&e),
        },
        ConsoleCommand::Move { category } => match session.categorize(&category) {
            Ok(outcome) => {
                OutputFormatter::success(&format!(
                    "Moved to {}",
                    outcome.action.destination().display()
                ));
                if outcome.all_categorized {
                    OutputFormatter::success("All images have been categorized.");
                } else {
                    OutputFormatter::status(session);
                }
            }
            Err(e) => report(&e),
        },
        ConsoleCommand::Undo => match session.undo() {
            Ok(outcome) => {
                let moved_at = outcome.action.moved_at().with_timezone(&Local);
                OutputFormatter::success(&format!(
                    "Restored {} (moved to {} at {})",
                    outcome.action.source().display(),
                    outcome.action.category(),
                    moved_at.format("%H:%M:%S")
                ));
                OutputFormatter::status(session);
            }
            Err(e) => report(&e),
        },
        ConsoleCommand::Status => OutputFormatter::status(session),
        ConsoleCommand::Categories => OutputFormatter::categories(session.categories()),
        ConsoleCommand::Quit => return Flow::Quit,
    }
    Flow::Continue
}

/// Opens `path`, showing a spinner while the folder is scanned.
pub fn open_folder<R: Rng>(session: &mut BrowsingController<R>, path: &Path) {
    let spinner = OutputFormatter::scan_spinner(&path.display().to_string());
    let result = session.open_folder(path);
    spinner.finish_and_clear();

    match result {
        Ok(OpenOutcome::Loaded { items }) => {
            OutputFormatter::success(&format!("Found {} images", items));
            OutputFormatter::categories(session.categories());
            OutputFormatter::status(session);
        }
        Ok(OpenOutcome::NoImages) => {
            OutputFormatter::warning("The selected folder contains no supported images.");
        }
        Err(e) => report(&e),
    }
}

fn navigate<R: Rng>(
    result: Result<Navigation, SortError>,
    session: &BrowsingController<R>,
) {
    match result {
        Ok(Navigation::Moved { .. }) => OutputFormatter::status(session),
        Ok(Navigation::AlreadyAtFirst) => OutputFormatter::warning("Already at the first image."),
        Ok(Navigation::AlreadyAtLast) => OutputFormatter::warning("Already at the last image."),
        Err(e) => report(&e),
    }
}

fn report(error: &SortError) {
    match error {
        SortError::NoCurrentItem => {
            OutputFormatter::warning("No image to show. Open a folder first.")
        }
        SortError::EmptyHistory => OutputFormatter::warning("Nothing to undo."),
        SortError::DuplicateCategory { name } => {
            OutputFormatter::warning(&format!("Category '{}' already exists.", name))
        }
        SortError::AlreadyInCategory { category, .. } => {
            OutputFormatter::warning(&format!("This image is already in '{}'.", category))
        }
        other => OutputFormatter::error(&other.to_string()),
    }
}
