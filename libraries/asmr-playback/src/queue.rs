//! Playback queue
//!
//! One ordered list mixing local and remote items, plus the index of the
//! active item:
//!
//! ```text
//! items:   [ local a ][ remote b ][ local c ]
//! current:              ^ Some(1)
//! ```
//!
//! The queue only does index bookkeeping. Source switching and handle
//! release are driven by [`crate::Player`] from the values returned here.

use crate::types::QueueItem;

/// Result of removing an item
#[derive(Debug, Clone)]
pub struct Removal {
    pub item: QueueItem,

    /// Active index after the removal
    pub new_current: Option<usize>,

    /// The removed item was the active one
    pub active_changed: bool,
}

/// Playback queue
#[derive(Debug, Clone, Default)]
pub struct Queue {
    items: Vec<QueueItem>,

    /// Always `None` or a valid index into `items`
    current: Option<usize>,
}

impl Queue {
    /// Create new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Append items
    ///
    /// When nothing is active, the first appended item becomes active and its
    /// index is returned.
    pub fn push_items(&mut self, items: impl IntoIterator<Item = QueueItem>) -> Option<usize> {
        let first_new = self.items.len();
        self.items.extend(items);

        if self.current.is_none() && self.items.len() > first_new {
            self.current = Some(first_new);
            return self.current;
        }
        None
    }

    /// Make `index` active; false when out of bounds
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.items.len() {
            self.current = Some(index);
            true
        } else {
            false
        }
    }

    /// Step forward; no wraparound
    pub fn next(&mut self) -> Option<usize> {
        let next = self.current? + 1;
        self.select(next).then_some(next)
    }

    /// Step back; no wraparound
    pub fn prev(&mut self) -> Option<usize> {
        let prev = self.current?.checked_sub(1)?;
        self.select(prev).then_some(prev)
    }

    /// Forget the active index without touching the items
    pub fn deselect(&mut self) {
        self.current = None;
    }

    /// Remove the item at `index`; `None` when out of bounds
    ///
    /// Removing the active item activates the one sliding into its slot,
    /// else the new last item, else nothing.
    pub fn remove(&mut self, index: usize) -> Option<Removal> {
        if index >= self.items.len() {
            return None;
        }
        let item = self.items.remove(index);
        let len = self.items.len();

        let (new_current, active_changed) = match self.current {
            Some(current) if current == index => {
                let next = if index < len {
                    Some(index)
                } else {
                    len.checked_sub(1)
                };
                (next, true)
            }
            Some(current) if index < current => (Some(current - 1), false),
            other => (other, false),
        };
        self.current = new_current;

        Some(Removal {
            item,
            new_current,
            active_changed,
        })
    }

    /// Remove everything; returns the removed items
    pub fn clear(&mut self) -> Vec<QueueItem> {
        self.current = None;
        std::mem::take(&mut self.items)
    }

    pub fn items(&self) -> &[QueueItem] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&QueueItem> {
        self.items.get(index)
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn current(&self) -> Option<&QueueItem> {
        self.items.get(self.current?)
    }

    /// Whether any item plays `url`
    pub fn contains_url(&self, url: &str) -> bool {
        self.items.iter().any(|item| item.url() == url)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.current.is_some_and(|c| c + 1 < self.items.len())
    }

    pub fn has_prev(&self) -> bool {
        self.current.is_some_and(|c| c > 0)
    }
}
