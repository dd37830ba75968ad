//! Undo/redo history for page edits.
//!
//! Every destructive edit records a snapshot of the page's object list before
//! it mutates anything. Undo swaps the page back to that snapshot and keeps the
//! state it replaced on the redo stack.

use crate::constants::MAX_UNDO_HISTORY;
use crate::types::{CanvasObject, Page, PageId};

/// The object list of a single page at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSnapshot {
    /// Page the snapshot was taken from
    pub page_id: PageId,
    /// Objects as they were when the snapshot was taken
    pub objects: Vec<CanvasObject>,
}

impl PageSnapshot {
    /// Captures the current objects of `page`.
    pub fn of(page: &Page) -> Self {
        Self {
            page_id: page.id.clone(),
            objects: page.objects.clone(),
        }
    }
}

/// Manages undo/redo history for the page being edited.
#[derive(Debug, Clone)]
pub struct UndoHistory {
    /// Snapshots that can be restored by undo
    undo_stack: Vec<PageSnapshot>,
    /// Snapshots that can be restored by redo
    redo_stack: Vec<PageSnapshot>,
    capacity: usize,
}

impl Default for UndoHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl UndoHistory {
    /// Creates a new empty undo history with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(MAX_UNDO_HISTORY)
    }

    /// Creates an empty history that keeps at most `capacity` undo steps.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Records the state of `page` before an edit.
    ///
    /// This clears the redo stack since a new edit invalidates anything that
    /// was previously undone.
    pub fn record(&mut self, page: &Page) {
        self.undo_stack.push(PageSnapshot::of(page));
        self.redo_stack.clear();

        if self.undo_stack.len() > self.capacity {
            self.undo_stack.remove(0);
        }
    }

    /// Returns true if there are edits that can be undone.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Returns true if there are edits that can be redone.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undo steps currently held.
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Restores the previous state of `page`.
    ///
    /// Returns false when there is nothing to undo or the latest snapshot
    /// belongs to a different page; the history is left untouched then.
    pub fn undo(&mut self, page: &mut Page) -> bool {
        Self::swap(&mut self.undo_stack, &mut self.redo_stack, page)
    }

    /// Re-applies the most recently undone edit to `page`.
    pub fn redo(&mut self, page: &mut Page) -> bool {
        Self::swap(&mut self.redo_stack, &mut self.undo_stack, page)
    }

    fn swap(from: &mut Vec<PageSnapshot>, to: &mut Vec<PageSnapshot>, page: &mut Page) -> bool {
        match from.last() {
            Some(snapshot) if snapshot.page_id == page.id => {}
            Some(snapshot) => {
                log::warn!(
                    "Ignoring snapshot for page '{}' while editing '{}'",
                    snapshot.page_id,
                    page.id
                );
                return false;
            }
            None => return false,
        }
        let Some(snapshot) = from.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut page.objects, snapshot.objects);
        to.push(PageSnapshot {
            page_id: snapshot.page_id,
            objects: current,
        });
        true
    }

    /// Clears all undo and redo history.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
