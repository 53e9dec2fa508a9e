/// Relocation history for undoing categorizations.
///
/// Every successful move is recorded as a [`RelocationAction`]; undo consumes
/// them strictly last-in-first-out.
use crate::error::{SortError, SortResult};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// One completed file move.
///
/// `destination` is where the file lives at the moment the action is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelocationAction {
    source: PathBuf,
    destination: PathBuf,
    category: String,
    moved_at: DateTime<Utc>,
}

impl RelocationAction {
    pub fn new(source: PathBuf, destination: PathBuf, category: impl Into<String>) -> Self {
        Self {
            source,
            destination,
            category: category.into(),
            moved_at: Utc::now(),
        }
    }

    /// Where the file was before the move.
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Where the file was moved to.
    pub fn destination(&self) -> &Path {
        &self.destination
    }

    /// The category the file was moved into.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// When the move happened.
    pub fn moved_at(&self) -> DateTime<Utc> {
        self.moved_at
    }
}

/// Last-in-first-out stack of relocation actions.
#[derive(Debug, Clone, Default)]
pub struct RelocationHistory {
    actions: Vec<RelocationAction>,
}

impl RelocationHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a completed move.
    pub fn push(&mut self, action: RelocationAction) {
        self.actions.push(action);
    }

    /// Removes and returns the most recent move.
    ///
    /// # Errors
    ///
    /// Returns [`SortError::EmptyHistory`] when there is nothing to undo.
    pub fn pop(&mut self) -> SortResult<RelocationAction> {
        self.actions.pop().ok_or(SortError::EmptyHistory)
    }

    pub fn last(&self) -> Option<&RelocationAction> {
        self.actions.last()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }

    /// Actions from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &RelocationAction> {
        self.actions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(name: &str) -> RelocationAction {
        RelocationAction::new(
            PathBuf::from(format!("/photos/{name}")),
            PathBuf::from(format!("/photos/cats/{name}")),
            "cats",
        )
    }

    #[test]
    fn test_action_is_stamped_when_created() {
        let before = Utc::now();
        let action = action("a.jpg");
        let after = Utc::now();

        assert!(action.moved_at() >= before);
        assert!(action.moved_at() <= after);
    }

    #[test]
    fn test_pop_empty_history() {
        let mut history = RelocationHistory::new();
        assert!(matches!(history.pop(), Err(SortError::EmptyHistory)));
    }

    #[test]
    fn test_history_is_lifo() {
        let mut history = RelocationHistory::new();
        history.push(action("a.jpg"));
        history.push(action("b.jpg"));
        assert_eq!(history.len(), 2);
        assert_eq!(history.last().unwrap().source(), Path::new("/photos/b.jpg"));

        assert_eq!(history.pop().unwrap().source(), Path::new("/photos/b.jpg"));
        assert_eq!(history.pop().unwrap().source(), Path::new("/photos/a.jpg"));
        assert!(history.is_empty());
    }

    #[test]
    fn test_iter_runs_oldest_first() {
        let mut history = RelocationHistory::new();
        history.push(action("a.jpg"));
        history.push(action("b.jpg"));

        let categories: Vec<_> = history.iter().map(|a| a.destination().to_path_buf()).collect();
        assert_eq!(
            categories,
            vec![
                PathBuf::from("/photos/cats/a.jpg"),
                PathBuf::from("/photos/cats/b.jpg")
            ]
        );

        history.clear();
        assert!(history.is_empty());
    }
}
