//! Error types shared by every browsing and sorting operation.

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while browsing or sorting a folder.
#[derive(Debug, Error)]
pub enum SortError {
    /// The base folder could not be scanned.
    #[error("Failed to scan {}: {source}", path.display())]
    Scan {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A category directory could not be created.
    #[error("Failed to create directory {}: {source}", path.display())]
    DirectoryCreation {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A file could not be moved.
    #[error("Failed to move {} to {}: {source}", from.display(), to.display())]
    Relocation {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },

    /// Something already exists where a file would be moved.
    #[error("A file already exists at {}", path.display())]
    DestinationOccupied { path: PathBuf },

    /// The file already sits directly inside the target category.
    #[error("{} is already in category '{category}'", path.display())]
    AlreadyInCategory { path: PathBuf, category: String },

    /// A category with this name already exists in the base folder.
    #[error("Category '{name}' already exists")]
    DuplicateCategory { name: String },

    /// The name cannot be used as a direct subfolder of the base folder.
    #[error("Invalid category name '{name}'")]
    InvalidCategoryName { name: String },

    /// Undo was requested with an empty history.
    #[error("Nothing to undo")]
    EmptyHistory,

    /// The operation needs a current item but none is loaded.
    #[error("No image is currently loaded")]
    NoCurrentItem,

    /// The operation needs an open folder.
    #[error("No folder is open")]
    NoFolderOpen,

    /// Configuration could not be loaded or compiled.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl SortError {
    /// Returns true for failures caused by the filesystem.
    pub fn is_io(&self) -> bool {
        matches!(
            self,
            Self::Scan { .. } | Self::DirectoryCreation { .. } | Self::Relocation { .. }
        )
    }
}

/// Result type for browsing and sorting operations.
pub type SortResult<T> = Result<T, SortError>;
