//! Discovery and bookkeeping of the image files in a folder tree.

use crate::config::CompiledFilters;
use crate::error::{SortError, SortResult};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File extensions accepted as images, compared case-insensitively.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Returns true if `path` has one of the accepted image extensions.
///
/// # Examples
///
/// ```
/// use picsort::item_set::is_image_path;
/// use std::path::Path;
///
/// assert!(is_image_path(Path::new("holiday/IMG_001.JPG")));
/// assert!(!is_image_path(Path::new("notes.txt")));
/// ```
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
}

/// The working set of items of a session, in scan order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemSet {
    items: Vec<PathBuf>,
}

impl ItemSet {
    /// Creates an item set from already known paths.
    pub fn from_paths(items: Vec<PathBuf>) -> Self {
        Self { items }
    }

    /// Recursively scans `base_folder` for image files.
    ///
    /// Entries are visited sorted by file name within each directory. Entries
    /// that cannot be read are logged and skipped; the scan itself only fails
    /// when `base_folder` is missing, not a directory, or unreadable.
    pub fn scan(base_folder: &Path, filters: &CompiledFilters) -> SortResult<Self> {
        let metadata = std::fs::metadata(base_folder).map_err(|e| SortError::Scan {
            path: base_folder.to_path_buf(),
            source: e,
        })?;
        if !metadata.is_dir() {
            return Err(SortError::Scan {
                path: base_folder.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path is not a directory",
                ),
            });
        }
        // Surface permission problems on the root itself as a scan failure.
        std::fs::read_dir(base_folder).map_err(|e| SortError::Scan {
            path: base_folder.to_path_buf(),
            source: e,
        })?;

        let mut items = Vec::new();
        for entry in WalkDir::new(base_folder).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", base_folder.display(), e);
                    continue;
                }
            };

            if !entry.file_type().is_file() || !is_image_path(entry.path()) {
                continue;
            }

            let relative = entry
                .path()
                .strip_prefix(base_folder)
                .unwrap_or(entry.path());
            if !filters.should_include(relative) {
                debug!("Filtered out {}", relative.display());
                continue;
            }

            items.push(entry.into_path());
        }

        debug!("Scanned {} images under {}", items.len(), base_folder.display());
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Path> {
        self.items.get(index).map(PathBuf::as_path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.items.iter().map(PathBuf::as_path)
    }

    /// Removes the item at `index`, shifting later items down.
    pub fn remove(&mut self, index: usize) -> Option<PathBuf> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Inserts `item` at `index` (clamped to the end), shifting later items up.
    /// Returns the index the item ended up at.
    pub fn insert(&mut self, index: usize, item: PathBuf) -> usize {
        let index = index.min(self.items.len());
        self.items.insert(index, item);
        index
    }
}
