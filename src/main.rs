use env_logger::Env;
use picsort::cli::{open_folder, run_console};
use picsort::output::OutputFormatter;
use picsort::{BrowsingController, SorterConfig};
use std::env;
use std::io;
use std::path::Path;

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    println!("Welcome to picsort - sort your images into folders!");
    println!("Type 'help' for the list of commands.");

    let settings = match SorterConfig::load(None).and_then(SorterConfig::compile) {
        Ok(settings) => settings,
        Err(e) => {
            OutputFormatter::error(&format!("Error loading configuration: {}", e));
            return;
        }
    };

    let mut session = BrowsingController::new(settings);

    // An optional folder to open right away.
    if let Some(folder) = env::args().nth(1) {
        open_folder(&mut session, Path::new(&folder));
    }

    if let Err(e) = run_console(&mut session, io::stdin().lock()) {
        OutputFormatter::error(&format!("Error reading input: {}", e));
    }
}
