//! # Undo/Redo History
//!
//! Snapshot-based history for the editor session.
//!
//! ## Design
//!
//! - `push` records a deep copy of the document and selection
//! - Undo restores the most recent snapshot that differs from the live state
//!   and moves the live state onto the redo stack
//! - Redo is the inverse
//! - The redo stack survives until the document changes again; the editor
//!   calls [`History::clear_redo`] on the first effective mutation after an
//!   undo
//! - Both stacks are bounded, oldest entries are dropped first

use std::collections::VecDeque;
use tracing::trace;

use crate::selection::Selection;
use crate::store::NodeStore;

/// Point-in-time copy of the document and selection.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub store: NodeStore,
    pub selection: Selection,
}

/// Undo/redo stacks of snapshots.
#[derive(Clone, Debug)]
pub struct History {
    /// Most recent last
    undo_stack: VecDeque<Snapshot>,
    /// Most recent last
    redo_stack: VecDeque<Snapshot>,
    /// Maximum entries per stack (0 = unlimited)
    max_levels: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(100)
    }
}

impl History {
    pub fn new(max_levels: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            max_levels,
        }
    }

    /// Record a snapshot. A snapshot equal to the current top is dropped.
    ///
    /// Returns whether the stack grew.
    pub fn push(&mut self, snapshot: Snapshot) -> bool {
        if self.undo_stack.back() == Some(&snapshot) {
            trace!(depth = self.undo_stack.len(), "history push coalesced");
            return false;
        }
        Self::push_bounded(&mut self.undo_stack, snapshot, self.max_levels);
        trace!(depth = self.undo_stack.len(), "history push");
        true
    }

    /// Step back from `current`.
    ///
    /// Entries equal to `current` are discarded first, so a trailing push
    /// with no edits after it does not cost an extra undo. Returns the
    /// snapshot to restore, or `None` when there is nothing to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        while self.undo_stack.back() == Some(&current) {
            self.undo_stack.pop_back();
        }
        let target = self.undo_stack.pop_back()?;
        Self::push_bounded(&mut self.redo_stack, current, self.max_levels);
        trace!(
            undo = self.undo_stack.len(),
            redo = self.redo_stack.len(),
            "undo"
        );
        Some(target)
    }

    /// Step forward from `current`. The inverse of [`History::undo`].
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        while self.redo_stack.back() == Some(&current) {
            self.redo_stack.pop_back();
        }
        let target = self.redo_stack.pop_back()?;
        Self::push_bounded(&mut self.undo_stack, current, self.max_levels);
        trace!(
            undo = self.undo_stack.len(),
            redo = self.redo_stack.len(),
            "redo"
        );
        Some(target)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_count(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_count(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    /// Drop the redo stack. Returns whether it held anything.
    pub fn clear_redo(&mut self) -> bool {
        let had_entries = !self.redo_stack.is_empty();
        self.redo_stack.clear();
        had_entries
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn push_bounded(stack: &mut VecDeque<Snapshot>, snapshot: Snapshot, max_levels: usize) {
        stack.push_back(snapshot);
        if max_levels > 0 {
            while stack.len() > max_levels {
                stack.pop_front();
            }
        }
    }
}
