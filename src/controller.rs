//! The browsing session a front end drives.
//!
//! A [`BrowsingController`] owns everything about one open folder: the items
//! found by the scan, the order they are browsed in, the cursor, the known
//! categories and the undo history. Front ends hold one controller and
//! forward user actions to it; every operation reports its result
//! synchronously and leaves the session untouched when it fails.
//!
//! ```text
//!            open_folder (0 items)          open_folder (>0 items)
//!   Empty ─────────────────────────▶ Empty ───────────────────────▶ Browsing
//!     ▲                                                               │
//!     └────────────── categorize (last item) ◀────────────────────────┘
//!                     undo ─────────────────────────────────────────▶ Browsing
//! ```

use crate::config::SessionSettings;
use crate::error::{SortError, SortResult};
use crate::history::{RelocationAction, RelocationHistory};
use crate::item_set::ItemSet;
use crate::order::{Order, OrderMode};
use crate::relocate::{FileRelocator, is_valid_category_name};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;
use std::path::{Path, PathBuf};

/// Whether the session currently has anything to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No folder opened, or no images left.
    Empty,
    /// At least one item is loaded and one of them is current.
    Browsing,
}

/// Result of opening a folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenOutcome {
    /// Images were found; the first one in browse order is current.
    Loaded { items: usize },
    /// The folder holds no accepted images.
    NoImages,
}

/// Result of a `next` or `previous` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The cursor moved to `position`.
    Moved { position: usize },
    /// `previous` was requested at the first item; nothing changed.
    AlreadyAtFirst,
    /// `next` was requested at the last item; nothing changed.
    AlreadyAtLast,
}

/// Current browse position, 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub index: usize,
    pub total: usize,
}

/// Result of a successful categorization.
#[derive(Debug, Clone)]
pub struct CategorizeOutcome {
    /// The recorded move.
    pub action: RelocationAction,
    /// Items still left to sort.
    pub remaining: usize,
    /// True when the moved item was the last one.
    pub all_categorized: bool,
}

/// Result of a successful undo.
#[derive(Debug, Clone)]
pub struct UndoOutcome {
    /// The move that was reverted.
    pub action: RelocationAction,
    /// Browse position of the restored item, which is now current.
    pub position: usize,
}

/// Session state for browsing and sorting one folder.
#[derive(Debug)]
pub struct BrowsingController<R = StdRng> {
    settings: SessionSettings,
    mode: OrderMode,
    rng: R,
    base_folder: Option<PathBuf>,
    items: ItemSet,
    order: Order,
    cursor: usize,
    categories: Vec<String>,
    history: RelocationHistory,
}

impl BrowsingController<StdRng> {
    /// Creates an empty session seeded from the operating system.
    pub fn new(settings: SessionSettings) -> Self {
        Self::with_rng(settings, StdRng::from_os_rng())
    }
}

impl Default for BrowsingController<StdRng> {
    fn default() -> Self {
        Self::new(SessionSettings::default())
    }
}

impl<R: Rng> BrowsingController<R> {
    /// Creates an empty session that shuffles with `rng`.
    pub fn with_rng(settings: SessionSettings, rng: R) -> Self {
        Self {
            mode: settings.initial_order,
            settings,
            rng,
            base_folder: None,
            items: ItemSet::default(),
            order: Order::default(),
            cursor: 0,
            categories: Vec::new(),
            history: RelocationHistory::new(),
        }
    }

    /// Opens `path` as the new base folder.
    ///
    /// The folder is resolved to an absolute, canonical path first, so items
    /// are always absolute.
    /// On a scan failure the previous session is kept as it was. Otherwise the
    /// session switches to `path`: categories are re-read from its immediate
    /// subfolders and the undo history starts empty.
    pub fn open_folder(&mut self, path: &Path) -> SortResult<OpenOutcome> {
        let base = fs::canonicalize(path).map_err(|e| SortError::Scan {
            path: path.to_path_buf(),
            source: e,
        })?;
        let path = base.as_path();
        let items = ItemSet::scan(path, &self.settings.filters)?;
        let categories = list_categories(path)?;

        info!(
            "Opened {} with {} images and {} categories",
            path.display(),
            items.len(),
            categories.len()
        );

        self.base_folder = Some(path.to_path_buf());
        self.order = Order::build(items.len(), self.mode, &mut self.rng);
        self.items = items;
        self.cursor = 0;
        self.categories = categories;
        self.history.clear();

        if self.items.is_empty() {
            Ok(OpenOutcome::NoImages)
        } else {
            Ok(OpenOutcome::Loaded {
                items: self.items.len(),
            })
        }
    }

    /// Moves to the next item. Does not wrap around.
    pub fn next(&mut self) -> SortResult<Navigation> {
        self.ensure_browsing()?;
        if self.cursor + 1 < self.order.len() {
            self.cursor += 1;
            debug!("Moved to position {}", self.cursor);
            Ok(Navigation::Moved {
                position: self.cursor,
            })
        } else {
            Ok(Navigation::AlreadyAtLast)
        }
    }

    /// Moves to the previous item. Does not wrap around.
    pub fn previous(&mut self) -> SortResult<Navigation> {
        self.ensure_browsing()?;
        if self.cursor > 0 {
            self.cursor -= 1;
            debug!("Moved to position {}", self.cursor);
            Ok(Navigation::Moved {
                position: self.cursor,
            })
        } else {
            Ok(Navigation::AlreadyAtFirst)
        }
    }

    /// Switches the browse order. While browsing, the order is rebuilt and the
    /// cursor goes back to the start.
    pub fn set_order_mode(&mut self, mode: OrderMode) {
        self.mode = mode;
        if self.state() == SessionState::Browsing {
            self.order = Order::build(self.items.len(), mode, &mut self.rng);
            self.cursor = 0;
            debug!("Rebuilt {} order over {} items", mode, self.items.len());
        }
    }

    /// Creates a new category subfolder in the base folder.
    ///
    /// The duplicate check looks at the folder on disk, so a directory created
    /// outside the session also counts.
    pub fn add_category(&mut self, name: &str) -> SortResult<()> {
        let base = self.base_folder.as_ref().ok_or(SortError::NoFolderOpen)?;
        if !is_valid_category_name(name) {
            return Err(SortError::InvalidCategoryName {
                name: name.to_string(),
            });
        }

        let category_path = base.join(name);
        if category_path.exists() {
            return Err(SortError::DuplicateCategory {
                name: name.to_string(),
            });
        }

        fs::create_dir(&category_path).map_err(|e| SortError::DirectoryCreation {
            path: category_path.clone(),
            source: e,
        })?;
        info!("Created category {}", name);
        self.register_category(name);
        Ok(())
    }

    /// Moves the current item into `category`.
    ///
    /// The file move is the commit point: if it fails, nothing in the session
    /// changes.
    pub fn categorize(&mut self, category: &str) -> SortResult<CategorizeOutcome> {
        self.ensure_browsing()?;
        let base = self.base_folder.clone().ok_or(SortError::NoFolderOpen)?;
        let item_index = self.order.item_at(self.cursor).ok_or(SortError::NoCurrentItem)?;
        let current = self
            .items
            .get(item_index)
            .ok_or(SortError::NoCurrentItem)?
            .to_path_buf();

        let action =
            FileRelocator::move_to_category(&base, &current, category, self.settings.on_conflict)
                .inspect_err(|e| warn!("Could not categorize {}: {}", current.display(), e))?;

        self.items.remove(item_index);
        self.order.remove_at(self.cursor);
        self.cursor = self.cursor.min(self.order.len().saturating_sub(1));
        self.register_category(category);
        self.history.push(action.clone());

        info!(
            "Moved {} to {}",
            action.source().display(),
            action.destination().display()
        );

        Ok(CategorizeOutcome {
            action,
            remaining: self.items.len(),
            all_categorized: self.items.is_empty(),
        })
    }

    /// Reverts the most recent categorization.
    ///
    /// The restored item is inserted at the cursor and becomes current. If the
    /// file cannot be moved back, the action is kept for another attempt unless
    /// the session is configured to drop it.
    pub fn undo(&mut self) -> SortResult<UndoOutcome> {
        let action = self.history.pop()?;

        if let Err(e) = FileRelocator::restore(&action) {
            warn!("Could not undo move of {}: {}", action.source().display(), e);
            if self.settings.retain_failed_undo {
                self.history.push(action);
            }
            return Err(e);
        }

        let slot = if self.items.is_empty() {
            0
        } else {
            self.cursor.min(self.items.len())
        };
        let item_index = self.items.insert(slot, action.source().to_path_buf());
        self.order.insert_at(slot, item_index);
        self.cursor = slot;

        info!("Restored {}", action.source().display());
        Ok(UndoOutcome {
            action,
            position: self.cursor,
        })
    }

    pub fn state(&self) -> SessionState {
        if self.items.is_empty() {
            SessionState::Empty
        } else {
            SessionState::Browsing
        }
    }

    /// Path of the item under the cursor.
    pub fn current_item(&self) -> Option<&Path> {
        self.order
            .item_at(self.cursor)
            .and_then(|index| self.items.get(index))
    }

    pub fn position(&self) -> Option<Position> {
        (self.state() == SessionState::Browsing).then_some(Position {
            index: self.cursor,
            total: self.order.len(),
        })
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    pub fn history(&self) -> &RelocationHistory {
        &self.history
    }

    pub fn order_mode(&self) -> OrderMode {
        self.mode
    }

    pub fn order(&self) -> &Order {
        &self.order
    }

    pub fn items(&self) -> &ItemSet {
        &self.items
    }

    pub fn base_folder(&self) -> Option<&Path> {
        self.base_folder.as_deref()
    }

    fn ensure_browsing(&self) -> SortResult<()> {
        match self.state() {
            SessionState::Browsing => Ok(()),
            SessionState::Empty => Err(SortError::NoCurrentItem),
        }
    }

    fn register_category(&mut self, name: &str) {
        if !self.categories.iter().any(|c| c == name) {
            self.categories.push(name.to_string());
        }
    }
}

/// Names of the immediate subfolders of `base`, sorted.
fn list_categories(base: &Path) -> SortResult<Vec<String>> {
    let entries = fs::read_dir(base).map_err(|e| SortError::Scan {
        path: base.to_path_buf(),
        source: e,
    })?;

    let mut names: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_dir()))
        .map(|entry| entry.file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SorterConfig;
    use tempfile::TempDir;

    fn controller() -> BrowsingController {
        BrowsingController::with_rng(SessionSettings::default(), StdRng::seed_from_u64(9))
    }

    fn folder_with(names: &[&str]) -> TempDir {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        for name in names {
            let path = temp_dir.path().join(name);
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent).expect("Failed to create parent");
            }
            fs::write(&path, name.as_bytes()).expect("Failed to write test file");
        }
        temp_dir
    }

    /// Canonical form of the temp folder, as the controller stores it.
    fn root(dir: &TempDir) -> PathBuf {
        dir.path().canonicalize().expect("Failed to canonicalize temp directory")
    }

    fn assert_invariants(session: &BrowsingController) {
        assert_eq!(session.order().len(), session.items().len());
        assert!(session.order().is_permutation());
        if session.state() == SessionState::Browsing {
            assert!(session.position().unwrap().index < session.order().len());
            assert!(session.current_item().is_some());
        } else {
            assert!(session.current_item().is_none());
        }
    }

    #[test]
    fn test_new_session_is_empty() {
        let mut session = controller();
        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.current_item().is_none());
        assert!(session.position().is_none());
        assert!(matches!(session.next(), Err(SortError::NoCurrentItem)));
        assert!(matches!(session.previous(), Err(SortError::NoCurrentItem)));
        assert!(matches!(
            session.categorize("cats"),
            Err(SortError::NoCurrentItem)
        ));
        assert!(matches!(
            session.add_category("cats"),
            Err(SortError::NoFolderOpen)
        ));
        assert!(matches!(session.undo(), Err(SortError::EmptyHistory)));
    }

    #[test]
    fn test_open_folder_loads_items_and_categories() {
        let dir = folder_with(&["a.jpg", "b.png", "notes.txt"]);
        fs::create_dir(root(&dir).join("dogs")).unwrap();
        fs::create_dir(root(&dir).join("cats")).unwrap();

        let mut session = controller();
        let outcome = session.open_folder(&root(&dir)).expect("Open failed");

        assert_eq!(outcome, OpenOutcome::Loaded { items: 2 });
        assert_eq!(session.state(), SessionState::Browsing);
        assert_eq!(session.position(), Some(Position { index: 0, total: 2 }));
        assert_eq!(session.current_item(), Some(root(&dir).join("a.jpg").as_path()));
        assert_eq!(session.categories(), &["cats".to_string(), "dogs".to_string()]);
        assert_invariants(&session);
    }

    #[test]
    fn test_open_folder_without_images() {
        let dir = folder_with(&["notes.txt"]);
        fs::create_dir(root(&dir).join("cats")).unwrap();

        let mut session = controller();
        let outcome = session.open_folder(&root(&dir)).expect("Open failed");

        assert_eq!(outcome, OpenOutcome::NoImages);
        assert_eq!(session.state(), SessionState::Empty);
        assert_eq!(session.categories(), &["cats".to_string()]);
        assert_eq!(session.base_folder(), Some(root(&dir).as_path()));
    }

    #[test]
    fn test_failed_open_keeps_previous_session() {
        let dir = folder_with(&["a.jpg", "b.jpg"]);
        let mut session = controller();
        session.open_folder(&root(&dir)).unwrap();
        session.next().unwrap();

        let result = session.open_folder(Path::new("/non/existent/path"));

        assert!(matches!(result, Err(SortError::Scan { .. })));
        assert_eq!(session.base_folder(), Some(root(&dir).as_path()));
        assert_eq!(session.position(), Some(Position { index: 1, total: 2 }));
    }

    #[test]
    fn test_navigation_does_not_wrap() {
        let dir = folder_with(&["a.jpg", "b.jpg", "c.jpg"]);
        let mut session = controller();
        session.open_folder(&root(&dir)).unwrap();

        assert_eq!(session.previous().unwrap(), Navigation::AlreadyAtFirst);
        assert_eq!(session.next().unwrap(), Navigation::Moved { position: 1 });
        assert_eq!(session.next().unwrap(), Navigation::Moved { position: 2 });
        assert_eq!(session.next().unwrap(), Navigation::AlreadyAtLast);
        assert_eq!(session.position().unwrap().index, 2);
        assert_eq!(session.previous().unwrap(), Navigation::Moved { position: 1 });
    }

    #[test]
    fn test_set_order_mode_rebuilds_and_resets_cursor() {
        let names: Vec<String> = (0..12).map(|i| format!("img{i:02}.jpg")).collect();
        let refs: Vec<&str> = names.iter().map(String::as_str).collect();
        let dir = folder_with(&refs);

        let mut session = controller();
        session.open_folder(&root(&dir)).unwrap();
        session.next().unwrap();

        session.set_order_mode(OrderMode::Shuffled);
        assert_eq!(session.order_mode(), OrderMode::Shuffled);
        assert_eq!(session.position().unwrap().index, 0);
        assert_invariants(&session);

        session.set_order_mode(OrderMode::Sequential);
        assert_eq!(session.order().as_slice(), (0..12).collect::<Vec<usize>>().as_slice());
    }

    #[test]
    fn test_set_order_mode_while_empty_applies_on_open() {
        let dir = folder_with(&["a.jpg", "b.jpg", "c.jpg", "d.jpg"]);
        let mut session = controller();
        session.set_order_mode(OrderMode::Shuffled);
        assert_eq!(session.state(), SessionState::Empty);

        session.open_folder(&root(&dir)).unwrap();
        assert_eq!(session.order_mode(), OrderMode::Shuffled);
        assert_invariants(&session);
    }

    #[test]
    fn test_categorize_moves_current_item() {
        let dir = folder_with(&["a.jpg", "b.jpg", "c.jpg"]);
        let mut session = controller();
        session.open_folder(&root(&dir)).unwrap();
        session.next().unwrap();

        let outcome = session.categorize("cats").expect("Categorize failed");

        assert_eq!(outcome.remaining, 2);
        assert!(!outcome.all_categorized);
        assert!(root(&dir).join("cats").join("b.jpg").exists());
        assert!(!root(&dir).join("b.jpg").exists());
        assert_eq!(session.current_item(), Some(root(&dir).join("c.jpg").as_path()));
        assert_eq!(session.categories(), &["cats".to_string()]);
        assert!(session.can_undo());
        assert_invariants(&session);
    }

    #[test]
    fn test_categorize_last_position_clamps_cursor() {
        let dir = folder_with(&["a.jpg", "b.jpg"]);
        let mut session = controller();
        session.open_folder(&root(&dir)).unwrap();
        session.next().unwrap();

        session.categorize("cats").unwrap();

        assert_eq!(session.position(), Some(Position { index: 0, total: 1 }));
        assert_eq!(session.current_item(), Some(root(&dir).join("a.jpg").as_path()));
    }

    #[test]
    fn test_categorize_only_item_empties_session() {
        let dir = folder_with(&["a.jpg"]);
        let mut session = controller();
        session.open_folder(&root(&dir)).unwrap();

        let outcome = session.categorize("cats").unwrap();

        assert!(outcome.all_categorized);
        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.current_item().is_none());
        assert_invariants(&session);
    }

    #[test]
    fn test_failed_categorize_changes_nothing() {
        let dir = folder_with(&["a.jpg", "b.jpg", "cats/a.jpg"]);
        let mut session = controller();
        session.open_folder(&root(&dir)).unwrap();
        let before = session.items().clone();

        let result = session.categorize("cats");

        assert!(matches!(result, Err(SortError::DestinationOccupied { .. })));
        assert_eq!(session.items(), &before);
        assert_eq!(session.position().unwrap().index, 0);
        assert!(!session.can_undo());
    }

    #[test]
    fn test_categorize_rejects_bad_name() {
        let dir = folder_with(&["a.jpg"]);
        let mut session = controller();
        session.open_folder(&root(&dir)).unwrap();

        assert!(matches!(
            session.categorize("../escape"),
            Err(SortError::InvalidCategoryName { .. })
        ));
        assert!(root(&dir).join("a.jpg").exists());
    }

    #[test]
    fn test_undo_restores_at_cursor() {
        let dir = folder_with(&["a.jpg", "b.jpg", "c.jpg"]);
        let mut session = controller();
        session.open_folder(&root(&dir)).unwrap();
        session.next().unwrap();
        session.categorize("cats").unwrap();

        let outcome = session.undo().expect("Undo failed");

        assert_eq!(outcome.position, 1);
        assert!(root(&dir).join("b.jpg").exists());
        assert_eq!(session.current_item(), Some(root(&dir).join("b.jpg").as_path()));
        assert!(!session.can_undo());
        assert_invariants(&session);
    }

    #[test]
    fn test_undo_after_everything_sorted() {
        let dir = folder_with(&["a.jpg"]);
        let mut session = controller();
        session.open_folder(&root(&dir)).unwrap();
        session.categorize("cats").unwrap();

        session.undo().unwrap();

        assert_eq!(session.state(), SessionState::Browsing);
        assert_eq!(session.current_item(), Some(root(&dir).join("a.jpg").as_path()));
        assert_invariants(&session);
    }

    #[test]
    fn test_failed_undo_is_retained_by_default() {
        let dir = folder_with(&["a.jpg", "b.jpg"]);
        let mut session = controller();
        session.open_folder(&root(&dir)).unwrap();
        session.categorize("cats").unwrap();
        fs::remove_file(root(&dir).join("cats").join("a.jpg")).unwrap();

        let result = session.undo();

        assert!(result.is_err_and(|e| e.is_io()));
        assert_eq!(session.history().len(), 1);
        assert_eq!(session.items().len(), 1);
        assert_invariants(&session);
    }

    #[test]
    fn test_failed_undo_dropped_when_configured() {
        let settings = SorterConfig::from_toml("[relocation]\nretain_failed_undo = false\n")
            .unwrap()
            .compile()
            .unwrap();
        let dir = folder_with(&["a.jpg", "b.jpg"]);
        let mut session = BrowsingController::with_rng(settings, StdRng::seed_from_u64(1));
        session.open_folder(&root(&dir)).unwrap();
        session.categorize("cats").unwrap();
        fs::remove_file(root(&dir).join("cats").join("a.jpg")).unwrap();

        assert!(session.undo().is_err());
        assert!(!session.can_undo());
        assert!(matches!(session.undo(), Err(SortError::EmptyHistory)));
    }

    #[test]
    fn test_add_category() {
        let dir = folder_with(&["a.jpg"]);
        fs::create_dir(root(&dir).join("cats")).unwrap();
        let mut session = controller();
        session.open_folder(&root(&dir)).unwrap();

        session.add_category("dogs").expect("Add failed");
        assert!(root(&dir).join("dogs").is_dir());
        assert_eq!(session.categories(), &["cats".to_string(), "dogs".to_string()]);

        assert!(matches!(
            session.add_category("cats"),
            Err(SortError::DuplicateCategory { .. })
        ));
        assert!(matches!(
            session.add_category(""),
            Err(SortError::InvalidCategoryName { .. })
        ));
        assert_eq!(session.categories().len(), 2);
    }

    #[test]
    fn test_add_category_checks_disk_not_list() {
        let dir = folder_with(&["a.jpg"]);
        let mut session = controller();
        session.open_folder(&root(&dir)).unwrap();
        fs::create_dir(root(&dir).join("birds")).unwrap();

        assert!(matches!(
            session.add_category("birds"),
            Err(SortError::DuplicateCategory { .. })
        ));
        assert!(session.categories().is_empty());
    }

    #[test]
    fn test_items_are_absolute_for_relative_open() {
        let dir = folder_with(&["a.jpg"]);
        let cwd = std::env::current_dir()
            .and_then(|cwd| cwd.canonicalize())
            .expect("Failed to read current directory");
        let relative: PathBuf = std::iter::repeat_n("..", cwd.components().count())
            .collect::<PathBuf>()
            .join(root(&dir).strip_prefix("/").unwrap());
        let mut session = controller();

        session.open_folder(&relative).expect("Open failed");

        assert_eq!(session.base_folder(), Some(root(&dir).as_path()));
        assert!(session.current_item().unwrap().is_absolute());
        assert_eq!(session.current_item(), Some(root(&dir).join("a.jpg").as_path()));
    }

    #[test]
    fn test_categorize_into_own_category_changes_nothing() {
        let dir = folder_with(&["cats/a.jpg"]);
        for policy in ["reject", "rename"] {
            let settings = SorterConfig::from_toml(&format!(
                "[relocation]\non_conflict = \"{policy}\"\n"
            ))
            .unwrap()
            .compile()
            .unwrap();
            let mut session = BrowsingController::with_rng(settings, StdRng::seed_from_u64(3));
            session.open_folder(&root(&dir)).unwrap();

            let result = session.categorize("cats");

            assert!(matches!(result, Err(SortError::AlreadyInCategory { .. })));
            assert!(root(&dir).join("cats").join("a.jpg").is_file());
            assert_eq!(fs::read_dir(root(&dir).join("cats")).unwrap().count(), 1);
            assert_eq!(session.items().len(), 1);
            assert!(!session.can_undo());
            assert_invariants(&session);
        }
    }

    #[test]
    fn test_reopen_clears_history() {
        let dir = folder_with(&["a.jpg", "b.jpg"]);
        let mut session = controller();
        session.open_folder(&root(&dir)).unwrap();
        session.categorize("cats").unwrap();

        session.open_folder(&root(&dir)).unwrap();

        assert!(!session.can_undo());
        // The scan is recursive, so the sorted file is found again.
        assert_eq!(session.items().len(), 2);
        assert_eq!(session.categories(), &["cats".to_string()]);
    }
}
