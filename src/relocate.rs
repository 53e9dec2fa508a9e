/// Filesystem moves behind categorize and undo.
///
/// Files are moved into category subdirectories of a base folder and back
/// again. A move either completes or leaves both paths untouched; callers
/// update their in-memory state only after it returns `Ok`.
use crate::error::{SortError, SortResult};
use crate::history::RelocationAction;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What to do when a file with the same name already exists in the category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Refuse the move.
    #[default]
    Reject,
    /// Move under a timestamped name next to the existing file.
    Rename,
}

/// Returns true if `name` can be used as a direct subfolder of the base folder.
pub fn is_valid_category_name(name: &str) -> bool {
    let trimmed = name.trim();
    !trimmed.is_empty()
        && trimmed == name
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

/// Moves files between the base folder tree and its category directories.
pub struct FileRelocator;

impl FileRelocator {
    /// Moves `file_path` into `base_path/category` and records the move.
    ///
    /// The category directory is created if it doesn't exist. When the
    /// destination name is taken, `policy` decides between failing with
    /// [`SortError::DestinationOccupied`] and picking a timestamped name.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use picsort::relocate::{ConflictPolicy, FileRelocator};
    /// use std::path::Path;
    ///
    /// let action = FileRelocator::move_to_category(
    ///     Path::new("/photos"),
    ///     Path::new("/photos/beach.jpg"),
    ///     "holiday",
    ///     ConflictPolicy::Reject,
    /// );
    ///
    /// match action {
    ///     Ok(a) => println!("Moved to {}", a.destination().display()),
    ///     Err(e) => eprintln!("Move failed: {}", e),
    /// }
    /// ```
    pub fn move_to_category(
        base_path: &Path,
        file_path: &Path,
        category: &str,
        policy: ConflictPolicy,
    ) -> SortResult<RelocationAction> {
        if !is_valid_category_name(category) {
            return Err(SortError::InvalidCategoryName {
                name: category.to_string(),
            });
        }

        let file_name = file_path
            .file_name()
            .ok_or_else(|| SortError::Relocation {
                from: file_path.to_path_buf(),
                to: base_path.join(category),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "file has no name component",
                ),
            })?;

        // Checked before creating the category so a vanished file leaves no trace.
        if !file_path.is_file() {
            return Err(SortError::Relocation {
                from: file_path.to_path_buf(),
                to: base_path.join(category).join(file_name),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
            });
        }

        let category_path = base_path.join(category);
        if file_path.parent() == Some(category_path.as_path()) {
            return Err(SortError::AlreadyInCategory {
                path: file_path.to_path_buf(),
                category: category.to_string(),
            });
        }
        if !category_path.is_dir() {
            fs::create_dir(&category_path).map_err(|e| SortError::DirectoryCreation {
                path: category_path.clone(),
                source: e,
            })?;
        }

        let mut destination = category_path.join(file_name);
        if destination.exists() {
            match policy {
                ConflictPolicy::Reject => {
                    return Err(SortError::DestinationOccupied { path: destination });
                }
                ConflictPolicy::Rename => destination = Self::free_name_for(&destination),
            }
        }

        fs::rename(file_path, &destination).map_err(|e| SortError::Relocation {
            from: file_path.to_path_buf(),
            to: destination.clone(),
            source: e,
        })?;

        Ok(RelocationAction::new(
            file_path.to_path_buf(),
            destination,
            category,
        ))
    }

    /// Moves the file recorded by `action` back to its source path.
    ///
    /// Fails with [`SortError::DestinationOccupied`] if something already sits
    /// at the source path, and with [`SortError::Relocation`] if the file is no
    /// longer where the action left it.
    pub fn restore(action: &RelocationAction) -> SortResult<()> {
        if action.source().exists() {
            return Err(SortError::DestinationOccupied {
                path: action.source().to_path_buf(),
            });
        }

        if let Some(parent) = action.source().parent()
            && !parent.is_dir()
        {
            fs::create_dir_all(parent).map_err(|e| SortError::DirectoryCreation {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        fs::rename(action.destination(), action.source()).map_err(|e| SortError::Relocation {
            from: action.destination().to_path_buf(),
            to: action.source().to_path_buf(),
            source: e,
        })
    }

    /// Picks a free name next to `occupied` by appending a timestamp.
    ///
    /// Example: `cat.jpg` becomes `cat.20251109-143052.jpg`, then
    /// `cat.20251109-143052-1.jpg` if that is taken too.
    fn free_name_for(occupied: &Path) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S").to_string();
        let stem = occupied
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "image".to_string());
        let extension = occupied
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let parent = occupied.parent().unwrap_or_else(|| Path::new(""));

        let mut candidate = parent.join(format!("{stem}.{timestamp}{extension}"));
        let mut counter = 1;
        while candidate.exists() {
            candidate = parent.join(format!("{stem}.{timestamp}-{counter}{extension}"));
            counter += 1;
        }
        candidate
    }
}
