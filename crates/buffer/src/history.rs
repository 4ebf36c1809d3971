//! Edit history (undo/redo)
//!
//! Every edit belongs to a group. Edits made inside a transaction share the
//! transaction's group; edits made outside one get a group of their own. Undo
//! and redo always move whole groups.

use crate::Edit;

/// Transaction / undo group ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransactionId(pub u64);

/// Edit history with undo/redo support
pub struct History {
    /// Undo stack
    undo_stack: Vec<HistoryEntry>,
    /// Redo stack
    redo_stack: Vec<HistoryEntry>,
    /// Maximum history size (in edits)
    max_size: usize,
    /// Group of the open transaction
    current_group: Option<TransactionId>,
    /// Next group ID
    next_group: u64,
}

impl History {
    pub fn new() -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_size: 1000,
            current_group: None,
            next_group: 1,
        }
    }

    pub fn with_max_size(max_size: usize) -> Self {
        Self {
            max_size,
            ..Self::new()
        }
    }

    /// Push an edit to history
    pub fn push(&mut self, edit: Edit, inverse: Edit) {
        // Clear redo stack on new edit
        self.redo_stack.clear();

        let group = match self.current_group {
            Some(group) => group,
            None => self.allocate_group(),
        };

        self.undo_stack.push(HistoryEntry { edit, inverse, group });
        self.trim();
    }

    /// Start a group of edits (treated as single undo unit)
    pub fn begin_group(&mut self) -> TransactionId {
        let group = self.allocate_group();
        self.current_group = Some(group);
        group
    }

    /// End current group
    pub fn end_group(&mut self) -> Option<TransactionId> {
        self.current_group.take()
    }

    /// Close the current group and drop its entries, returning the inverse
    /// edits to apply (most recent first) to revert them.
    pub fn discard_group(&mut self) -> Vec<Edit> {
        let Some(group) = self.current_group.take() else {
            return Vec::new();
        };

        let mut inverses = Vec::new();
        while self.undo_stack.last().is_some_and(|entry| entry.group == group) {
            if let Some(entry) = self.undo_stack.pop() {
                inverses.push(entry.inverse);
            }
        }
        inverses
    }

    /// Undo the last group (returns the edits to apply, in order)
    pub fn undo(&mut self) -> Vec<Edit> {
        let Some(group) = self.undo_stack.last().map(|entry| entry.group) else {
            return Vec::new();
        };

        let mut edits = Vec::new();
        while self.undo_stack.last().is_some_and(|entry| entry.group == group) {
            if let Some(entry) = self.undo_stack.pop() {
                edits.push(entry.inverse.clone());
                self.redo_stack.push(entry);
            }
        }
        edits
    }

    /// Redo the last undone group (returns the edits to apply, in order)
    pub fn redo(&mut self) -> Vec<Edit> {
        let Some(group) = self.redo_stack.last().map(|entry| entry.group) else {
            return Vec::new();
        };

        let mut edits = Vec::new();
        while self.redo_stack.last().is_some_and(|entry| entry.group == group) {
            if let Some(entry) = self.redo_stack.pop() {
                edits.push(entry.edit.clone());
                self.undo_stack.push(entry);
            }
        }
        edits
    }

    /// Can undo?
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Can redo?
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Clear all history
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Number of undoable groups
    pub fn undo_count(&self) -> usize {
        count_groups(&self.undo_stack)
    }

    /// Number of redoable groups
    pub fn redo_count(&self) -> usize {
        count_groups(&self.redo_stack)
    }

    fn allocate_group(&mut self) -> TransactionId {
        let id = TransactionId(self.next_group);
        self.next_group += 1;
        id
    }

    /// Drop the oldest groups while over capacity, never the open one
    fn trim(&mut self) {
        while self.undo_stack.len() > self.max_size {
            let oldest = self.undo_stack[0].group;
            if Some(oldest) == self.current_group {
                break;
            }
            let keep_from = self
                .undo_stack
                .iter()
                .position(|entry| entry.group != oldest)
                .unwrap_or(self.undo_stack.len());
            self.undo_stack.drain(..keep_from);
        }
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

/// A history entry
struct HistoryEntry {
    edit: Edit,
    inverse: Edit,
    group: TransactionId,
}

fn count_groups(entries: &[HistoryEntry]) -> usize {
    entries
        .iter()
        .enumerate()
        .filter(|(i, entry)| *i == 0 || entries[i - 1].group != entry.group)
        .count()
}
