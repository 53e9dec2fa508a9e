//! picsort - browse images in a folder tree and sort them into category subfolders
//!
//! This library provides the browsing and sorting engine: discovering image
//! files, walking them in sequential or shuffled order, moving the current
//! image into a category subfolder, and undoing those moves last-in-first-out.
//! A small interactive console front end is included.

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod history;
pub mod item_set;
pub mod order;
pub mod output;
pub mod relocate;

pub use config::{CompiledFilters, ConfigError, SessionSettings, SorterConfig};
pub use controller::{
    BrowsingController, CategorizeOutcome, Navigation, OpenOutcome, Position, SessionState,
    UndoOutcome,
};
pub use error::{SortError, SortResult};
pub use history::{RelocationAction, RelocationHistory};
pub use item_set::ItemSet;
pub use order::{Order, OrderMode};
pub use relocate::{ConflictPolicy, FileRelocator};
