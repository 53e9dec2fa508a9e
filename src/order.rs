//! Browse order over the items of a session.
//!
//! An [`Order`] is a permutation of `0..count`: entry `p` names the item shown
//! at browse position `p`. It is built from scratch when a folder is opened or
//! the mode changes, and repaired in place when a single item leaves or
//! re-enters the set.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a session walks through its items.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum OrderMode {
    /// Items in scan order.
    #[default]
    Sequential,
    /// A uniformly random permutation of the items.
    Shuffled,
}

impl fmt::Display for OrderMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderMode::Sequential => write!(f, "sequential"),
            OrderMode::Shuffled => write!(f, "shuffled"),
        }
    }
}

/// A traversal order: browse position -> item index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Order {
    indices: Vec<usize>,
}

impl Order {
    /// Builds an order over `count` items.
    ///
    /// # Examples
    ///
    /// ```
    /// use picsort::order::{Order, OrderMode};
    ///
    /// let order = Order::build(3, OrderMode::Sequential, &mut rand::rng());
    /// assert_eq!(order.as_slice(), &[0, 1, 2]);
    /// ```
    pub fn build<R: Rng + ?Sized>(count: usize, mode: OrderMode, rng: &mut R) -> Self {
        let mut indices: Vec<usize> = (0..count).collect();
        if mode == OrderMode::Shuffled {
            indices.shuffle(rng);
        }
        Self { indices }
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Item index shown at `position`.
    pub fn item_at(&self, position: usize) -> Option<usize> {
        self.indices.get(position).copied()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    /// Drops `position` after its item was removed from the item set.
    ///
    /// Entries above the removed item index are decremented to follow the
    /// compaction of the item set. Returns the removed item index.
    pub fn remove_at(&mut self, position: usize) -> Option<usize> {
        if position >= self.indices.len() {
            return None;
        }
        let removed = self.indices.remove(position);
        for index in &mut self.indices {
            if *index > removed {
                *index -= 1;
            }
        }
        Some(removed)
    }

    /// Places a newly inserted item at `position`.
    ///
    /// `item_index` is where the item now sits in the item set; existing
    /// entries at or above it are shifted up first.
    pub fn insert_at(&mut self, position: usize, item_index: usize) {
        for index in &mut self.indices {
            if *index >= item_index {
                *index += 1;
            }
        }
        let position = position.min(self.indices.len());
        self.indices.insert(position, item_index);
    }

    /// True when the order is a permutation of `0..len`.
    pub fn is_permutation(&self) -> bool {
        let mut seen = vec![false; self.indices.len()];
        for &index in &self.indices {
            match seen.get_mut(index) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }
}
